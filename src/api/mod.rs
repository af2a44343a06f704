use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AnalysisError;
use crate::models::{AnalysisReport, ApiResponse, Fixture, League, StatCard, Team, SAMPLE_SIZE};
use crate::services::{
    AnalysisEngine, AnalysisSession, Catalog, Command, Language, Options, Renderer, TEAMS_FAILED,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub engine: Arc<AnalysisEngine>,
    pub language: Language,
}

pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Matchup analyzer API listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/leagues", get(list_leagues_handler))
        .route("/leagues/{id}/teams", get(list_teams_handler))
        .route("/leagues/{id}/teams/{team_id}/matches", get(last_matches_handler))
        .route("/analysis", post(analysis_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::MissingSelection => StatusCode::BAD_REQUEST,
        AnalysisError::AnalysisInFlight => StatusCode::CONFLICT,
        AnalysisError::UnknownLeague(_) | AnalysisError::UnknownTeam { .. } => {
            StatusCode::NOT_FOUND
        }
        AnalysisError::InvalidRange { .. } | AnalysisError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AnalysisError::Database(_) | AnalysisError::Http(_) | AnalysisError::Upstream { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

type Rejection = (StatusCode, Json<ApiResponse<()>>);

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (status, Json(ApiResponse::error(message.into())))
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Matchup analyzer is running"))
}

// GET /leagues - Leagues available for analysis
async fn list_leagues_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<League>>>, Rejection> {
    match state.catalog.list_leagues().await {
        Ok(leagues) => Ok(Json(ApiResponse::success(leagues))),
        Err(e) => {
            tracing::error!("Failed to fetch leagues: {}", e);
            Err(reject(status_for(&e), e.to_string()))
        }
    }
}

// GET /leagues/{id}/teams - Teams of one league
async fn list_teams_handler(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Team>>>, Rejection> {
    match state.catalog.list_teams(&league_id).await {
        Ok(teams) => Ok(Json(ApiResponse::success(teams))),
        Err(e) => {
            tracing::error!("Failed to fetch teams for league {}: {}", league_id, e);
            Err(reject(status_for(&e), e.to_string()))
        }
    }
}

// GET /leagues/{id}/teams/{team_id}/matches?last=5 - Recent results of a team
#[derive(Debug, Deserialize)]
struct MatchesQuery {
    last: Option<u32>,
}

async fn last_matches_handler(
    State(state): State<AppState>,
    Path((league_id, team_id)): Path<(String, String)>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<ApiResponse<Vec<Fixture>>>, Rejection> {
    let last = query.last.unwrap_or(SAMPLE_SIZE);
    match state.catalog.last_matches(&team_id, &league_id, last).await {
        Ok(matches) => Ok(Json(ApiResponse::success(matches))),
        Err(e) => {
            tracing::error!("Failed to fetch matches for team {}: {}", team_id, e);
            Err(reject(status_for(&e), e.to_string()))
        }
    }
}

// POST /analysis - Synthesize statistics and a recommendation for a pairing
#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    league_id: Option<String>,
    home_team_id: Option<String>,
    away_team_id: Option<String>,
    seed: Option<u64>,
    language: Option<Language>,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    report: AnalysisReport,
    cards: Vec<StatCard>,
    lines: Vec<String>,
}

async fn analysis_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<AnalysisResponse>>, Rejection> {
    let mut session = AnalysisSession::new(state.catalog.clone(), state.engine.clone());

    let commands = [
        Command::SelectLeague(request.league_id),
        Command::SelectHomeTeam(request.home_team_id),
        Command::SelectAwayTeam(request.away_team_id),
    ];
    for command in commands {
        let selecting_league = matches!(command, Command::SelectLeague(_));
        if let Err(e) = session.handle(command).await {
            tracing::warn!("Rejected analysis request: {}", e);
            return Err(reject(status_for(&e), e.to_string()));
        }
        if selecting_league && matches!(session.teams(), Options::Failed(_)) {
            return Err(reject(StatusCode::BAD_GATEWAY, TEAMS_FAILED));
        }
    }

    if let Err(e) = session.handle(Command::Analyze { seed: request.seed }).await {
        tracing::warn!("Rejected analysis request: {}", e);
        let message = session.notice().map(str::to_string).unwrap_or_else(|| e.to_string());
        return Err(reject(status_for(&e), message));
    }

    let report = session
        .take_report()
        .ok_or_else(|| reject(StatusCode::INTERNAL_SERVER_ERROR, "analysis produced no report"))?;
    let renderer = Renderer::local(request.language.unwrap_or(state.language));

    Ok(Json(ApiResponse::success(AnalysisResponse {
        cards: renderer.stat_cards(&report.statistics),
        lines: renderer.render_recommendation(&report.recommendation),
        report,
    })))
}
