pub mod seed;
pub use seed::seed_data;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, FromRow, SqlitePool};
use std::str::FromStr;

use crate::error::AnalysisResult;
use crate::models::{Fixture, FixtureSide, League, Score, Team};
use crate::services::Catalog;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/matchup.db";

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if let Some(parent) = std::path::Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Called from the CLI where no pool exists yet.
pub async fn init_database(database_url: &str) -> Result<()> {
    let pool = create_pool(database_url).await?;
    init_database_with_pool(&pool).await?;
    seed_data(&pool).await
}

/// Creates the schema. Only `leagues` and `teams` are read by the catalog;
/// the remaining tables describe a future real-data backend.
pub async fn init_database_with_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leagues (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            country TEXT,
            logo_url TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            short_name TEXT,
            league_id TEXT,
            logo_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (league_id) REFERENCES leagues (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            league_id TEXT NOT NULL,
            home_team_id TEXT NOT NULL,
            away_team_id TEXT NOT NULL,
            match_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'scheduled'
                CHECK (status IN ('scheduled', 'in_play', 'finished', 'postponed', 'canceled')),
            home_score INTEGER,
            away_score INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (league_id) REFERENCES leagues (id),
            FOREIGN KEY (home_team_id) REFERENCES teams (id),
            FOREIGN KEY (away_team_id) REFERENCES teams (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS match_analytics (
            id TEXT PRIMARY KEY,
            match_id TEXT NOT NULL,
            home_win_probability REAL,
            draw_probability REAL,
            away_win_probability REAL,
            home_goals INTEGER,
            away_goals INTEGER,
            home_corners INTEGER,
            away_corners INTEGER,
            home_yellow_cards INTEGER,
            away_yellow_cards INTEGER,
            home_red_cards INTEGER,
            away_red_cards INTEGER,
            home_possession REAL,
            away_possession REAL,
            home_shots_on_target INTEGER,
            away_shots_on_target INTEGER,
            home_shots_off_target INTEGER,
            away_shots_off_target INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (match_id) REFERENCES matches (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ai_recommendations (
            id TEXT PRIMARY KEY,
            match_id TEXT,
            recommendation_type TEXT NOT NULL
                CHECK (recommendation_type IN ('1x2', 'over_under', 'both_teams_to_score', 'handicap', 'correct_score')),
            confidence_score REAL NOT NULL,
            description TEXT,
            reasoning TEXT,
            is_correct INTEGER,
            created_at TEXT NOT NULL,
            FOREIGN KEY (match_id) REFERENCES matches (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            plan_type TEXT NOT NULL CHECK (plan_type IN ('free', 'premium', 'pro')),
            status TEXT NOT NULL CHECK (status IN ('active', 'inactive', 'cancelled')),
            stripe_customer_id TEXT,
            stripe_subscription_id TEXT,
            current_period_start TEXT,
            current_period_end TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_teams_league ON teams(league_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date)")
        .execute(pool)
        .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

// League operations
pub async fn insert_league(pool: &SqlitePool, league: &League) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO leagues (id, name, country, is_active, created_at, updated_at)
        VALUES (?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(&league.id)
    .bind(&league.name)
    .bind(&league.country)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_active_leagues(pool: &SqlitePool) -> AnalysisResult<Vec<League>> {
    let leagues = sqlx::query_as::<_, League>(
        "SELECT id, name, country FROM leagues WHERE is_active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(leagues)
}

// Team operations
pub async fn insert_team(pool: &SqlitePool, league_id: &str, team: &Team) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO teams (id, name, short_name, league_id, logo_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&team.id)
    .bind(&team.name)
    .bind(&team.short_name)
    .bind(league_id)
    .bind(&team.logo_url)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_teams_by_league(pool: &SqlitePool, league_id: &str) -> AnalysisResult<Vec<Team>> {
    let teams = sqlx::query_as::<_, Team>(
        "SELECT id, name, short_name, logo_url FROM teams WHERE league_id = ? ORDER BY name",
    )
    .bind(league_id)
    .fetch_all(pool)
    .await?;

    Ok(teams)
}

// Match operations
pub async fn insert_match(pool: &SqlitePool, league_id: &str, fixture: &Fixture) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    let status = if fixture.fulltime.home.is_some() { "finished" } else { "scheduled" };
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO matches
            (id, league_id, home_team_id, away_team_id, match_date, status,
             home_score, away_score, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&fixture.id)
    .bind(league_id)
    .bind(&fixture.home.id)
    .bind(&fixture.away.id)
    .bind(&fixture.date)
    .bind(status)
    .bind(fixture.fulltime.home)
    .bind(fixture.fulltime.away)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

#[derive(FromRow)]
struct MatchRow {
    id: String,
    match_date: String,
    home_team_id: String,
    home_name: String,
    away_team_id: String,
    away_name: String,
    home_score: Option<i64>,
    away_score: Option<i64>,
}

impl From<MatchRow> for Fixture {
    fn from(row: MatchRow) -> Self {
        let score = Score {
            home: row.home_score.and_then(|g| u32::try_from(g).ok()),
            away: row.away_score.and_then(|g| u32::try_from(g).ok()),
        };
        Fixture {
            id: row.id,
            date: row.match_date,
            home: FixtureSide {
                id: row.home_team_id,
                name: row.home_name,
            },
            away: FixtureSide {
                id: row.away_team_id,
                name: row.away_name,
            },
            goals: score,
            // Half-time scores are not stored.
            halftime: Score::default(),
            fulltime: score,
        }
    }
}

pub async fn get_last_matches(
    pool: &SqlitePool,
    team_id: &str,
    league_id: &str,
    last: u32,
) -> AnalysisResult<Vec<Fixture>> {
    let rows = sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT m.id, m.match_date,
               m.home_team_id, h.name AS home_name,
               m.away_team_id, a.name AS away_name,
               m.home_score, m.away_score
        FROM matches m
        JOIN teams h ON h.id = m.home_team_id
        JOIN teams a ON a.id = m.away_team_id
        WHERE m.league_id = ?
          AND (m.home_team_id = ? OR m.away_team_id = ?)
          AND m.status = 'finished'
        ORDER BY m.match_date DESC
        LIMIT ?
        "#,
    )
    .bind(league_id)
    .bind(team_id)
    .bind(team_id)
    .bind(i64::from(last))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Fixture::from).collect())
}

/// Catalog backed by the `leagues`, `teams` and `matches` tables.
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn list_leagues(&self) -> AnalysisResult<Vec<League>> {
        get_active_leagues(&self.pool).await
    }

    async fn list_teams(&self, league_id: &str) -> AnalysisResult<Vec<Team>> {
        get_teams_by_league(&self.pool, league_id).await
    }

    async fn last_matches(
        &self,
        team_id: &str,
        league_id: &str,
        last: u32,
    ) -> AnalysisResult<Vec<Fixture>> {
        get_last_matches(&self.pool, team_id, league_id, last).await
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // One connection: every new in-memory connection would be a fresh database.
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_catalog_matches_mock() {
        let pool = memory_pool().await;
        init_database_with_pool(&pool).await.unwrap();
        seed_data(&pool).await.unwrap();

        let catalog = SqliteCatalog::new(pool);
        let leagues = catalog.list_leagues().await.unwrap();
        let names: Vec<&str> = leagues.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Brasileiro Série A", "Premier League"]);
        assert_eq!(leagues[1].country.as_deref(), Some("England"));

        let teams = catalog.list_teams("71").await.unwrap();
        let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Flamengo", "Palmeiras"]);
    }

    #[tokio::test]
    async fn test_last_matches_from_seeded_fixtures() {
        let pool = memory_pool().await;
        init_database_with_pool(&pool).await.unwrap();
        seed_data(&pool).await.unwrap();

        let catalog = SqliteCatalog::new(pool);
        let matches = catalog.last_matches("131", "71", 5).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].scoreline(), "Flamengo 2 - 1 Palmeiras");
        assert_eq!(matches[0].date, "2023-05-15");

        assert!(catalog.last_matches("131", "39", 5).await.unwrap().is_empty());
        assert!(catalog.last_matches("131", "71", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unplayed_matches_are_skipped() {
        let pool = memory_pool().await;
        init_database_with_pool(&pool).await.unwrap();
        seed_data(&pool).await.unwrap();
        let upcoming = Fixture {
            id: "2".to_string(),
            date: "2023-06-01".to_string(),
            home: FixtureSide {
                id: "134".to_string(),
                name: "Palmeiras".to_string(),
            },
            away: FixtureSide {
                id: "131".to_string(),
                name: "Flamengo".to_string(),
            },
            goals: Score::default(),
            halftime: Score::default(),
            fulltime: Score::default(),
        };
        insert_match(&pool, "71", &upcoming).await.unwrap();

        let matches = SqliteCatalog::new(pool).last_matches("134", "71", 5).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[tokio::test]
    async fn test_inactive_leagues_hidden() {
        let pool = memory_pool().await;
        init_database_with_pool(&pool).await.unwrap();
        seed_data(&pool).await.unwrap();
        sqlx::query("UPDATE leagues SET is_active = 0 WHERE id = '71'")
            .execute(&pool)
            .await
            .unwrap();

        let leagues = SqliteCatalog::new(pool).list_leagues().await.unwrap();
        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].id, "39");
    }

    #[tokio::test]
    async fn test_unknown_league_returns_no_teams() {
        let pool = memory_pool().await;
        init_database_with_pool(&pool).await.unwrap();
        let teams = SqliteCatalog::new(pool).list_teams("404").await.unwrap();
        assert!(teams.is_empty());
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let pool = memory_pool().await;
        init_database_with_pool(&pool).await.unwrap();
        init_database_with_pool(&pool).await.unwrap();
    }
}
