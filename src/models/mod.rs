use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Number of past matches the synthesized statistics claim to summarise.
pub const SAMPLE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct League {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
}

impl League {
    /// Dropdown label, e.g. "Premier League (England)".
    pub fn label(&self) -> String {
        match &self.country {
            Some(country) => format!("{} ({})", self.name, country),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
}

/// Goals per side; both absent until the match has been played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSide {
    pub id: String,
    pub name: String,
}

/// A played match as listed by a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub date: String,
    pub home: FixtureSide,
    pub away: FixtureSide,
    pub goals: Score,
    pub halftime: Score,
    pub fulltime: Score,
}

impl Fixture {
    pub fn involves(&self, team_id: &str) -> bool {
        self.home.id == team_id || self.away.id == team_id
    }

    /// "Flamengo 2 - 1 Palmeiras", or "vs" while unplayed.
    pub fn scoreline(&self) -> String {
        match (self.fulltime.home, self.fulltime.away) {
            (Some(home), Some(away)) => {
                format!("{} {} - {} {}", self.home.name, home, away, self.away.name)
            }
            _ => format!("{} vs {}", self.home.name, self.away.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsBundle {
    pub home_team: String,
    pub away_team: String,
    pub sample_size: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
    pub home_goals: u32,
    pub away_goals: u32,
    pub avg_home_goals: f64,
    pub avg_away_goals: f64,
    pub over_two_point_five_count: u32,
    pub corners: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub both_teams_scored_count: u32,
    pub home_win_probability: i32,
    pub away_win_probability: i32,
    // Not clamped: negative whenever home + away > 100.
    pub draw_probability: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Outcome,
    GoalTotal,
    BothTeamsScore,
    Discipline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    HomeFavoured { team: String, probability: i32 },
    AwayFavoured { team: String, probability: i32 },
    DrawLikely { probability: i32 },
    OverGoals { count: u32, sample_size: u32 },
    UnderGoals,
    BothTeamsScore { count: u32, sample_size: u32 },
    HighCardCount { average_per_match: f64 },
}

impl Finding {
    pub fn rule(&self) -> RuleKind {
        match self {
            Finding::HomeFavoured { .. }
            | Finding::AwayFavoured { .. }
            | Finding::DrawLikely { .. } => RuleKind::Outcome,
            Finding::OverGoals { .. } | Finding::UnderGoals => RuleKind::GoalTotal,
            Finding::BothTeamsScore { .. } => RuleKind::BothTeamsScore,
            Finding::HighCardCount { .. } => RuleKind::Discipline,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Finding::HomeFavoured { .. } => "📈",
            Finding::AwayFavoured { .. } => "📉",
            Finding::DrawLikely { .. } => "⚖",
            Finding::OverGoals { .. } => "🎯",
            Finding::UnderGoals => "🛡",
            Finding::BothTeamsScore { .. } => "🔔",
            Finding::HighCardCount { .. } => "🟨",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub sample_size: u32,
    pub findings: Vec<Finding>,
    pub generated_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn rules(&self) -> Vec<RuleKind> {
        self.findings.iter().map(Finding::rule).collect()
    }
}

/// One analysis request's output. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub seed: u64,
    pub statistics: StatisticsBundle,
    pub recommendation: Recommendation,
}

/// A labelled value as shown on the results grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

// API Response types
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
