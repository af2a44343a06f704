use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{Finding, Recommendation, StatisticsBundle};
use crate::utils::round_to_tenths;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Turns a statistics bundle into an ordered list of findings.
///
/// Rules run in a fixed order: outcome, goal total, both teams to score,
/// discipline. The first two always contribute one finding; the last two
/// only when their threshold is crossed.
#[derive(Clone)]
pub struct RecommendationComposer {
    clock: Arc<dyn Clock>,
}

impl RecommendationComposer {
    const HOME_WIN_THRESHOLD: i32 = 50;
    const AWAY_WIN_THRESHOLD: i32 = 45;
    const OVER_GOALS_MIN_MATCHES: u32 = 3;
    const BOTH_SCORE_MIN_MATCHES: u32 = 3;
    const YELLOW_CARDS_THRESHOLD: u32 = 12;

    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn compose(&self, bundle: &StatisticsBundle) -> Recommendation {
        let mut findings = vec![Self::outcome(bundle), Self::goal_total(bundle)];
        findings.extend(Self::both_teams_score(bundle));
        findings.extend(Self::discipline(bundle));

        Recommendation {
            sample_size: bundle.sample_size,
            findings,
            generated_at: self.clock.now(),
        }
    }

    fn outcome(bundle: &StatisticsBundle) -> Finding {
        if bundle.home_win_probability > Self::HOME_WIN_THRESHOLD {
            Finding::HomeFavoured {
                team: bundle.home_team.clone(),
                probability: bundle.home_win_probability,
            }
        } else if bundle.away_win_probability > Self::AWAY_WIN_THRESHOLD {
            Finding::AwayFavoured {
                team: bundle.away_team.clone(),
                probability: bundle.away_win_probability,
            }
        } else {
            Finding::DrawLikely {
                probability: bundle.draw_probability,
            }
        }
    }

    fn goal_total(bundle: &StatisticsBundle) -> Finding {
        if bundle.over_two_point_five_count >= Self::OVER_GOALS_MIN_MATCHES {
            Finding::OverGoals {
                count: bundle.over_two_point_five_count,
                sample_size: bundle.sample_size,
            }
        } else {
            Finding::UnderGoals
        }
    }

    // No counterpart finding when the threshold is missed, unlike goal_total.
    fn both_teams_score(bundle: &StatisticsBundle) -> Option<Finding> {
        (bundle.both_teams_scored_count >= Self::BOTH_SCORE_MIN_MATCHES).then(|| {
            Finding::BothTeamsScore {
                count: bundle.both_teams_scored_count,
                sample_size: bundle.sample_size,
            }
        })
    }

    fn discipline(bundle: &StatisticsBundle) -> Option<Finding> {
        if bundle.yellow_cards <= Self::YELLOW_CARDS_THRESHOLD || bundle.sample_size == 0 {
            return None;
        }
        Some(Finding::HighCardCount {
            average_per_match: round_to_tenths(
                bundle.yellow_cards as f64 / bundle.sample_size as f64,
            ),
        })
    }
}
