use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{AnalysisReport, League, Team};
use crate::services::{AnalysisEngine, Catalog};

pub const MISSING_SELECTION_NOTICE: &str = "Select a league and both teams to analyse!";
pub const RETRY_NOTICE: &str = "Error analysing the matchup. Please try again.";
pub const LEAGUES_FAILED: &str = "Error loading leagues";
pub const TEAMS_FAILED: &str = "Error loading teams";

/// Contents of a picker.
#[derive(Debug, Clone, PartialEq)]
pub enum Options<T> {
    /// Team pickers stay empty until a league is chosen.
    AwaitingLeague,
    Loaded(Vec<T>),
    /// Loading failed; the picker shows this placeholder instead.
    Failed(String),
}

impl<T> Options<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Options::Loaded(items) => items,
            _ => &[],
        }
    }
}

/// A user action on the analysis form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectLeague(Option<String>),
    SelectHomeTeam(Option<String>),
    SelectAwayTeam(Option<String>),
    Analyze { seed: Option<u64> },
}

/// Form state behind the league/team pickers and the analyse button.
pub struct AnalysisSession {
    catalog: Arc<dyn Catalog>,
    engine: Arc<AnalysisEngine>,
    leagues: Options<League>,
    teams: Options<Team>,
    league_id: Option<String>,
    home_team_id: Option<String>,
    away_team_id: Option<String>,
    trigger_enabled: bool,
    notice: Option<String>,
    last_report: Option<AnalysisReport>,
}

impl AnalysisSession {
    pub fn new(catalog: Arc<dyn Catalog>, engine: Arc<AnalysisEngine>) -> Self {
        Self {
            catalog,
            engine,
            leagues: Options::AwaitingLeague,
            teams: Options::AwaitingLeague,
            league_id: None,
            home_team_id: None,
            away_team_id: None,
            trigger_enabled: true,
            notice: None,
            last_report: None,
        }
    }

    /// Load the league picker. A catalog failure leaves a placeholder, not an error.
    pub async fn open(&mut self) {
        self.leagues = match self.catalog.list_leagues().await {
            Ok(leagues) => Options::Loaded(leagues),
            Err(e) => {
                tracing::error!("Failed to load leagues: {}", e);
                Options::Failed(LEAGUES_FAILED.to_string())
            }
        };
    }

    pub async fn handle(&mut self, command: Command) -> AnalysisResult<()> {
        match command {
            Command::SelectLeague(league_id) => {
                self.select_league(league_id).await;
                Ok(())
            }
            Command::SelectHomeTeam(team_id) => {
                self.home_team_id = self.checked_team(team_id)?;
                Ok(())
            }
            Command::SelectAwayTeam(team_id) => {
                self.away_team_id = self.checked_team(team_id)?;
                Ok(())
            }
            Command::Analyze { seed } => self.analyze(seed),
        }
    }

    async fn select_league(&mut self, league_id: Option<String>) {
        self.home_team_id = None;
        self.away_team_id = None;
        self.notice = None;

        let Some(league_id) = league_id.filter(|id| !id.is_empty()) else {
            self.league_id = None;
            self.teams = Options::AwaitingLeague;
            return;
        };

        self.teams = match self.catalog.list_teams(&league_id).await {
            Ok(teams) => Options::Loaded(teams),
            Err(e) => {
                tracing::error!("Failed to load teams for league {}: {}", league_id, e);
                Options::Failed(TEAMS_FAILED.to_string())
            }
        };
        self.league_id = Some(league_id);
    }

    fn checked_team(&self, team_id: Option<String>) -> AnalysisResult<Option<String>> {
        match team_id.filter(|id| !id.is_empty()) {
            None => Ok(None),
            Some(id) if self.team(&id).is_some() => Ok(Some(id)),
            Some(id) => Err(AnalysisError::UnknownTeam {
                league: self.league_id.clone().unwrap_or_default(),
                team: id,
            }),
        }
    }

    fn analyze(&mut self, seed: Option<u64>) -> AnalysisResult<()> {
        let (Some(_), Some(home_id), Some(away_id)) =
            (&self.league_id, &self.home_team_id, &self.away_team_id)
        else {
            self.notice = Some(MISSING_SELECTION_NOTICE.to_string());
            return Err(AnalysisError::MissingSelection);
        };

        if !self.trigger_enabled {
            return Err(AnalysisError::AnalysisInFlight);
        }

        // Display names are read from the loaded picker, like the labels of the selected options.
        let names = self
            .team(home_id)
            .zip(self.team(away_id))
            .map(|(home, away)| (home.name.clone(), away.name.clone()));

        let outcome = match names {
            Some((home, away)) => {
                self.trigger_enabled = false;
                let engine = &self.engine;
                let run =
                    panic::catch_unwind(AssertUnwindSafe(|| engine.analyze(&home, &away, seed)));
                self.trigger_enabled = true;
                run.map_err(|_| {
                    AnalysisError::Internal(format!("analysis of {} vs {} panicked", home, away))
                })
            }
            None => Err(AnalysisError::UnknownTeam {
                league: self.league_id.clone().unwrap_or_default(),
                team: format!("{}/{}", home_id, away_id),
            }),
        };

        match outcome {
            Ok(report) => {
                self.notice = None;
                self.last_report = Some(report);
                Ok(())
            }
            Err(e) if e.is_user_error() => {
                tracing::warn!("Analysis rejected: {}", e);
                self.notice = Some(e.to_string());
                Err(e)
            }
            Err(e) => {
                tracing::error!("Analysis failed: {}", e);
                self.notice = Some(RETRY_NOTICE.to_string());
                Err(e)
            }
        }
    }

    fn team(&self, id: &str) -> Option<&Team> {
        self.teams.items().iter().find(|t| t.id == id)
    }

    pub fn leagues(&self) -> &Options<League> {
        &self.leagues
    }

    pub fn teams(&self) -> &Options<Team> {
        &self.teams
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn last_report(&self) -> Option<&AnalysisReport> {
        self.last_report.as_ref()
    }

    pub fn take_report(&mut self) -> Option<AnalysisReport> {
        self.last_report.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fixture;
    use crate::services::{Clock, MockCatalog, SynthesisMode};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    struct BrokenCatalog;

    #[async_trait]
    impl Catalog for BrokenCatalog {
        async fn list_leagues(&self) -> AnalysisResult<Vec<League>> {
            Err(AnalysisError::Upstream { status: 503 })
        }

        async fn list_teams(&self, _league_id: &str) -> AnalysisResult<Vec<Team>> {
            Err(AnalysisError::Upstream { status: 503 })
        }

        async fn last_matches(
            &self,
            _team_id: &str,
            _league_id: &str,
            _last: u32,
        ) -> AnalysisResult<Vec<Fixture>> {
            Err(AnalysisError::Upstream { status: 503 })
        }
    }

    struct StoppedClock;

    impl Clock for StoppedClock {
        fn now(&self) -> DateTime<Utc> {
            panic!("clock unavailable")
        }
    }

    fn session_with(catalog: Arc<dyn Catalog>) -> AnalysisSession {
        let engine = AnalysisEngine::with_mode(SynthesisMode::Faithful).unwrap();
        AnalysisSession::new(catalog, Arc::new(engine))
    }

    async fn ready_session() -> AnalysisSession {
        let mut session = session_with(Arc::new(MockCatalog::default()));
        session.open().await;
        session.handle(Command::SelectLeague(Some("39".to_string()))).await.unwrap();
        session.handle(Command::SelectHomeTeam(Some("40".to_string()))).await.unwrap();
        session.handle(Command::SelectAwayTeam(Some("50".to_string()))).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_full_flow_produces_report() {
        let mut session = ready_session().await;
        session.handle(Command::Analyze { seed: Some(11) }).await.unwrap();

        let report = session.last_report().unwrap();
        assert_eq!(report.seed, 11);
        assert_eq!(report.statistics.home_team, "Liverpool");
        assert_eq!(report.statistics.away_team, "Manchester City");
        assert!(session.trigger_enabled);
        assert_eq!(session.notice(), None);
    }

    #[tokio::test]
    async fn test_analyze_without_selection_is_rejected() {
        let mut session = session_with(Arc::new(MockCatalog::default()));
        session.open().await;
        session.handle(Command::SelectLeague(Some("71".to_string()))).await.unwrap();
        session.handle(Command::SelectHomeTeam(Some("131".to_string()))).await.unwrap();

        let err = session.handle(Command::Analyze { seed: None }).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingSelection));
        assert_eq!(session.notice(), Some(MISSING_SELECTION_NOTICE));
        assert!(session.last_report().is_none());
        assert!(session.trigger_enabled);
    }

    #[tokio::test]
    async fn test_clearing_league_resets_team_pickers() {
        let mut session = ready_session().await;
        session.handle(Command::SelectLeague(None)).await.unwrap();

        assert_eq!(session.teams(), &Options::AwaitingLeague);
        assert_eq!(session.league_id, None);
        let err = session.handle(Command::Analyze { seed: None }).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingSelection));
    }

    #[tokio::test]
    async fn test_switching_league_clears_team_selection() {
        let mut session = ready_session().await;
        session.handle(Command::SelectLeague(Some("71".to_string()))).await.unwrap();
        assert_eq!(session.teams().items().len(), 2);
        assert!(session.handle(Command::Analyze { seed: None }).await.is_err());
    }

    #[tokio::test]
    async fn test_team_outside_league_is_rejected() {
        let mut session = ready_session().await;
        let err = session
            .handle(Command::SelectHomeTeam(Some("131".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownTeam { .. }));
    }

    #[tokio::test]
    async fn test_in_flight_analysis_blocks_second_trigger() {
        let mut session = ready_session().await;
        session.trigger_enabled = false;
        let err = session.handle(Command::Analyze { seed: None }).await.unwrap_err();
        assert!(matches!(err, AnalysisError::AnalysisInFlight));
    }

    #[tokio::test]
    async fn test_engine_panic_shows_retry_notice_and_restores_trigger() {
        let engine = AnalysisEngine::with_mode(SynthesisMode::Faithful)
            .unwrap()
            .with_clock(Arc::new(StoppedClock));
        let mut session = AnalysisSession::new(Arc::new(MockCatalog::default()), Arc::new(engine));
        session.open().await;
        session.handle(Command::SelectLeague(Some("71".to_string()))).await.unwrap();
        session.handle(Command::SelectHomeTeam(Some("131".to_string()))).await.unwrap();
        session.handle(Command::SelectAwayTeam(Some("134".to_string()))).await.unwrap();

        let err = session.handle(Command::Analyze { seed: Some(1) }).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Internal(_)));
        assert_eq!(session.notice(), Some(RETRY_NOTICE));
        assert!(session.trigger_enabled);
        assert!(session.last_report().is_none());

        // The form stays usable after a failure.
        let err = session.handle(Command::Analyze { seed: Some(2) }).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Internal(_)));
    }

    #[tokio::test]
    async fn test_same_team_on_both_sides_is_allowed() {
        let mut session = ready_session().await;
        session.handle(Command::SelectAwayTeam(Some("40".to_string()))).await.unwrap();
        session.handle(Command::Analyze { seed: Some(5) }).await.unwrap();
        let stats = &session.last_report().unwrap().statistics;
        assert_eq!(stats.home_team, stats.away_team);
    }

    #[tokio::test]
    async fn test_catalog_failures_show_placeholders() {
        let mut session = session_with(Arc::new(BrokenCatalog));
        session.open().await;
        assert_eq!(session.leagues(), &Options::Failed(LEAGUES_FAILED.to_string()));

        session.handle(Command::SelectLeague(Some("39".to_string()))).await.unwrap();
        assert_eq!(session.teams(), &Options::Failed(TEAMS_FAILED.to_string()));
        assert!(session.trigger_enabled);
    }
}
