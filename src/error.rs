use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("empty sampling range for {field}: [{low}, {high}]")]
    InvalidRange {
        field: &'static str,
        low: f64,
        high: f64,
    },

    #[error("select a league and both teams before analysing")]
    MissingSelection,

    #[error("an analysis is already in progress")]
    AnalysisInFlight,

    #[error("unknown league: {0}")]
    UnknownLeague(String),

    #[error("unknown team {team} in league {league}")]
    UnknownTeam { league: String, team: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("{0}")]
    Internal(String),
}

impl AnalysisError {
    /// Selection problems are the caller's to fix; everything else is ours or upstream's.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingSelection
                | Self::AnalysisInFlight
                | Self::UnknownTeam { .. }
                | Self::UnknownLeague(_)
        )
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
