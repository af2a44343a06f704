use clap::ValueEnum;
use rand::distr::uniform::SampleUniform;
use rand::distr::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{StatisticsBundle, SAMPLE_SIZE};
use crate::utils::round_to_tenths;

/// How much internal consistency the synthesized statistics are forced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMode {
    /// Every field drawn independently; win/draw counts need not add up to the
    /// sample size and the draw probability may go negative.
    #[default]
    Faithful,
    /// Draw count fills the sample and the three probabilities form a distribution.
    Coherent,
}

/// Sampling ranges. Integer ranges are inclusive, decimal ranges half-open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRanges {
    pub home_wins: (u32, u32),
    pub away_wins: (u32, u32),
    pub draws: (u32, u32),
    pub home_goals: (u32, u32),
    pub away_goals: (u32, u32),
    pub avg_home_goals: (f64, f64),
    pub avg_away_goals: (f64, f64),
    pub over_two_point_five: (u32, u32),
    pub corners: (u32, u32),
    pub yellow_cards: (u32, u32),
    pub red_cards: (u32, u32),
    pub both_teams_scored: (u32, u32),
    pub home_win_probability: (i32, i32),
    pub away_win_probability: (i32, i32),
}

impl Default for StatRanges {
    fn default() -> Self {
        Self {
            home_wins: (0, 3),
            away_wins: (0, 2),
            draws: (0, 1),
            home_goals: (5, 14),
            away_goals: (3, 10),
            avg_home_goals: (1.0, 3.0),
            avg_away_goals: (0.5, 2.0),
            over_two_point_five: (2, 4),
            corners: (10, 39),
            yellow_cards: (5, 19),
            red_cards: (0, 2),
            both_teams_scored: (1, 3),
            home_win_probability: (40, 79),
            away_win_probability: (20, 49),
        }
    }
}

/// Produces mock match statistics for a pairing of teams.
///
/// The random source is supplied per call, so a seeded generator yields the
/// same bundle every time.
#[derive(Debug, Clone)]
pub struct StatisticsSynthesizer {
    mode: SynthesisMode,
    home_wins: Uniform<u32>,
    away_wins: Uniform<u32>,
    draws: Uniform<u32>,
    home_goals: Uniform<u32>,
    away_goals: Uniform<u32>,
    avg_home_goals: Uniform<f64>,
    avg_away_goals: Uniform<f64>,
    over_two_point_five: Uniform<u32>,
    corners: Uniform<u32>,
    yellow_cards: Uniform<u32>,
    red_cards: Uniform<u32>,
    both_teams_scored: Uniform<u32>,
    home_win_probability: Uniform<i32>,
    away_win_probability: Uniform<i32>,
}

impl StatisticsSynthesizer {
    pub fn new(mode: SynthesisMode) -> AnalysisResult<Self> {
        Self::with_ranges(StatRanges::default(), mode)
    }

    pub fn with_ranges(ranges: StatRanges, mode: SynthesisMode) -> AnalysisResult<Self> {
        Ok(Self {
            mode,
            home_wins: inclusive("home_wins", ranges.home_wins)?,
            away_wins: inclusive("away_wins", ranges.away_wins)?,
            draws: inclusive("draws", ranges.draws)?,
            home_goals: inclusive("home_goals", ranges.home_goals)?,
            away_goals: inclusive("away_goals", ranges.away_goals)?,
            avg_home_goals: half_open("avg_home_goals", ranges.avg_home_goals)?,
            avg_away_goals: half_open("avg_away_goals", ranges.avg_away_goals)?,
            over_two_point_five: inclusive("over_two_point_five", ranges.over_two_point_five)?,
            corners: inclusive("corners", ranges.corners)?,
            yellow_cards: inclusive("yellow_cards", ranges.yellow_cards)?,
            red_cards: inclusive("red_cards", ranges.red_cards)?,
            both_teams_scored: inclusive("both_teams_scored", ranges.both_teams_scored)?,
            home_win_probability: inclusive("home_win_probability", ranges.home_win_probability)?,
            away_win_probability: inclusive("away_win_probability", ranges.away_win_probability)?,
        })
    }

    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        home_team: &str,
        away_team: &str,
    ) -> StatisticsBundle {
        // Draw order is fixed; changing it changes every seeded bundle.
        let home_wins = self.home_wins.sample(rng);
        let away_wins = self.away_wins.sample(rng);
        let draws = self.draws.sample(rng);
        let home_goals = self.home_goals.sample(rng);
        let away_goals = self.away_goals.sample(rng);
        let avg_home_goals = round_to_tenths(self.avg_home_goals.sample(rng));
        let avg_away_goals = round_to_tenths(self.avg_away_goals.sample(rng));
        let over_two_point_five_count = self.over_two_point_five.sample(rng);
        let corners = self.corners.sample(rng);
        let yellow_cards = self.yellow_cards.sample(rng);
        let red_cards = self.red_cards.sample(rng);
        let both_teams_scored_count = self.both_teams_scored.sample(rng);
        let home_win_probability = self.home_win_probability.sample(rng);
        let away_win_probability = self.away_win_probability.sample(rng);

        let (draws, home_win_probability, away_win_probability) = match self.mode {
            SynthesisMode::Faithful => (draws, home_win_probability, away_win_probability),
            SynthesisMode::Coherent => {
                let home = home_win_probability.clamp(0, 100);
                let away = away_win_probability.clamp(0, 100 - home);
                (SAMPLE_SIZE.saturating_sub(home_wins + away_wins), home, away)
            }
        };

        StatisticsBundle {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            sample_size: SAMPLE_SIZE,
            home_wins,
            away_wins,
            draws,
            home_goals,
            away_goals,
            avg_home_goals,
            avg_away_goals,
            over_two_point_five_count,
            corners,
            yellow_cards,
            red_cards,
            both_teams_scored_count,
            home_win_probability,
            away_win_probability,
            draw_probability: 100 - home_win_probability - away_win_probability,
        }
    }
}

fn inclusive<T>(field: &'static str, (low, high): (T, T)) -> AnalysisResult<Uniform<T>>
where
    T: SampleUniform + Copy + Into<f64>,
{
    Uniform::new_inclusive(low, high).map_err(|_| AnalysisError::InvalidRange {
        field,
        low: low.into(),
        high: high.into(),
    })
}

fn half_open(field: &'static str, (low, high): (f64, f64)) -> AnalysisResult<Uniform<f64>> {
    Uniform::new(low, high).map_err(|_| AnalysisError::InvalidRange { field, low, high })
}
