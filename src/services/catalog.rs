use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AnalysisResult;
use crate::models::{Fixture, FixtureSide, League, Score, Team};

/// Source of the leagues and teams a user picks from.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_leagues(&self) -> AnalysisResult<Vec<League>>;

    /// Teams of a league; an unknown league yields an empty list.
    async fn list_teams(&self, league_id: &str) -> AnalysisResult<Vec<Team>>;

    /// Up to `last` most recent matches of a team in a league, newest first.
    async fn last_matches(
        &self,
        team_id: &str,
        league_id: &str,
        last: u32,
    ) -> AnalysisResult<Vec<Fixture>>;
}

/// Fixed in-memory catalog, used when no real data source is configured.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    leagues: Vec<League>,
    teams: HashMap<String, Vec<Team>>,
    fixtures: HashMap<String, Vec<Fixture>>,
}

impl MockCatalog {
    pub fn new(
        leagues: Vec<League>,
        teams: HashMap<String, Vec<Team>>,
        fixtures: HashMap<String, Vec<Fixture>>,
    ) -> Self {
        Self {
            leagues,
            teams,
            fixtures,
        }
    }

    pub fn leagues(&self) -> &[League] {
        &self.leagues
    }

    pub fn teams(&self, league_id: &str) -> &[Team] {
        self.teams.get(league_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fixtures(&self, league_id: &str) -> &[Fixture] {
        self.fixtures.get(league_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        let league = |id: &str, name: &str, country: &str| League {
            id: id.to_string(),
            name: name.to_string(),
            country: Some(country.to_string()),
        };
        let team = |id: &str, name: &str| Team {
            id: id.to_string(),
            name: name.to_string(),
            short_name: None,
            logo_url: None,
        };

        let leagues = vec![
            league("71", "Brasileiro Série A", "Brazil"),
            league("39", "Premier League", "England"),
        ];
        let teams = HashMap::from([
            ("71".to_string(), vec![team("131", "Flamengo"), team("134", "Palmeiras")]),
            ("39".to_string(), vec![team("40", "Liverpool"), team("50", "Manchester City")]),
        ]);

        let side = |id: &str, name: &str| FixtureSide {
            id: id.to_string(),
            name: name.to_string(),
        };
        let score = |home: u32, away: u32| Score {
            home: Some(home),
            away: Some(away),
        };
        let fixtures = HashMap::from([(
            "71".to_string(),
            vec![Fixture {
                id: "1".to_string(),
                date: "2023-05-15".to_string(),
                home: side("131", "Flamengo"),
                away: side("134", "Palmeiras"),
                goals: score(2, 1),
                halftime: score(1, 0),
                fulltime: score(2, 1),
            }],
        )]);

        Self::new(leagues, teams, fixtures)
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn list_leagues(&self) -> AnalysisResult<Vec<League>> {
        Ok(self.leagues.clone())
    }

    async fn list_teams(&self, league_id: &str) -> AnalysisResult<Vec<Team>> {
        Ok(self.teams(league_id).to_vec())
    }

    async fn last_matches(
        &self,
        team_id: &str,
        league_id: &str,
        last: u32,
    ) -> AnalysisResult<Vec<Fixture>> {
        let mut matches: Vec<Fixture> = self
            .fixtures(league_id)
            .iter()
            .filter(|f| f.involves(team_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date));
        matches.truncate(last as usize);
        Ok(matches)
    }
}
