use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Fixture, FixtureSide, League, Score, Team};
use crate::services::Catalog;

pub const DEFAULT_BASE_URL: &str = "https://api-football-v1.p.rapidapi.com/v3";
const RAPIDAPI_HOST: &str = "api-football-v1.p.rapidapi.com";

// ── API-Football response structures ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct LeagueEntry {
    pub league: LeagueInfo,
    pub country: CountryInfo,
}

#[derive(Debug, Deserialize)]
pub struct LeagueInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CountryInfo {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamEntry {
    pub team: TeamInfo,
}

#[derive(Debug, Deserialize)]
pub struct TeamInfo {
    pub id: u32,
    pub name: String,
    pub code: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureEntry {
    pub fixture: FixtureInfo,
    pub teams: FixtureTeams,
    pub goals: Score,
    #[serde(default)]
    pub score: FixtureScore,
}

#[derive(Debug, Deserialize)]
pub struct FixtureInfo {
    pub id: u32,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct FixtureTeams {
    pub home: SideInfo,
    pub away: SideInfo,
}

#[derive(Debug, Deserialize)]
pub struct SideInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FixtureScore {
    #[serde(default)]
    pub halftime: Score,
    #[serde(default)]
    pub fulltime: Score,
}

impl From<SideInfo> for FixtureSide {
    fn from(side: SideInfo) -> Self {
        FixtureSide {
            id: side.id.to_string(),
            name: side.name,
        }
    }
}

impl From<FixtureEntry> for Fixture {
    fn from(entry: FixtureEntry) -> Self {
        Fixture {
            id: entry.fixture.id.to_string(),
            date: entry.fixture.date,
            home: entry.teams.home.into(),
            away: entry.teams.away.into(),
            goals: entry.goals,
            halftime: entry.score.halftime,
            fulltime: entry.score.fulltime,
        }
    }
}

impl From<LeagueEntry> for League {
    fn from(entry: LeagueEntry) -> Self {
        League {
            id: entry.league.id.to_string(),
            name: entry.league.name,
            country: entry.country.name,
        }
    }
}

impl From<TeamEntry> for Team {
    fn from(entry: TeamEntry) -> Self {
        Team {
            id: entry.team.id.to_string(),
            name: entry.team.name,
            short_name: entry.team.code,
            logo_url: entry.team.logo.filter(|logo| !logo.is_empty()),
        }
    }
}

// ── ApiFootballCatalog ──────────────────────────────────────────────────────

pub struct ApiFootballCatalog {
    client: Client,
    base_url: String,
    api_key: String,
    season: u16,
}

impl ApiFootballCatalog {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, season: u16) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            season,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AnalysisResult<Envelope<T>> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("API-Football {} returned {}", path, status);
            return Err(AnalysisError::Upstream { status: status.as_u16() });
        }

        Ok(response.json::<Envelope<T>>().await?)
    }
}

#[async_trait]
impl Catalog for ApiFootballCatalog {
    async fn list_leagues(&self) -> AnalysisResult<Vec<League>> {
        let envelope = self.get::<LeagueEntry>("/leagues", &[]).await?;
        Ok(parse_leagues(envelope))
    }

    async fn list_teams(&self, league_id: &str) -> AnalysisResult<Vec<Team>> {
        let query = [
            ("league", league_id.to_string()),
            ("season", self.season.to_string()),
        ];
        let envelope = self.get::<TeamEntry>("/teams", &query).await?;
        Ok(parse_teams(envelope))
    }

    async fn last_matches(
        &self,
        team_id: &str,
        league_id: &str,
        last: u32,
    ) -> AnalysisResult<Vec<Fixture>> {
        if last == 0 {
            return Ok(Vec::new());
        }
        let query = [
            ("team", team_id.to_string()),
            ("league", league_id.to_string()),
            ("last", last.to_string()),
        ];
        let envelope = self.get::<FixtureEntry>("/fixtures", &query).await?;
        Ok(parse_fixtures(envelope))
    }
}

pub fn parse_leagues(envelope: Envelope<LeagueEntry>) -> Vec<League> {
    envelope.response.into_iter().map(League::from).collect()
}

pub fn parse_teams(envelope: Envelope<TeamEntry>) -> Vec<Team> {
    envelope.response.into_iter().map(Team::from).collect()
}

pub fn parse_fixtures(envelope: Envelope<FixtureEntry>) -> Vec<Fixture> {
    envelope.response.into_iter().map(Fixture::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leagues_payload() {
        let payload = r#"{
            "get": "leagues",
            "response": [
                {
                    "league": {"id": 39, "name": "Premier League", "type": "League"},
                    "country": {"name": "England", "code": "GB"},
                    "seasons": []
                },
                {
                    "league": {"id": 2, "name": "UEFA Champions League", "type": "Cup"},
                    "country": {"name": null}
                }
            ]
        }"#;
        let envelope: Envelope<LeagueEntry> = serde_json::from_str(payload).unwrap();
        let leagues = parse_leagues(envelope);

        assert_eq!(leagues.len(), 2);
        assert_eq!(leagues[0].id, "39");
        assert_eq!(leagues[0].label(), "Premier League (England)");
        assert_eq!(leagues[1].country, None);
    }

    #[test]
    fn test_parse_teams_payload() {
        let payload = r#"{
            "response": [
                {
                    "team": {
                        "id": 40,
                        "name": "Liverpool",
                        "code": "LIV",
                        "logo": "https://media.api-sports.io/football/teams/40.png"
                    },
                    "venue": {"name": "Anfield"}
                },
                {
                    "team": {"id": 50, "name": "Manchester City", "logo": ""}
                }
            ]
        }"#;
        let envelope: Envelope<TeamEntry> = serde_json::from_str(payload).unwrap();
        let teams = parse_teams(envelope);

        assert_eq!(teams[0].id, "40");
        assert_eq!(teams[0].short_name.as_deref(), Some("LIV"));
        assert!(teams[0].logo_url.is_some());
        assert_eq!(teams[1].short_name, None);
        assert_eq!(teams[1].logo_url, None);
    }

    #[test]
    fn test_parse_fixtures_payload() {
        let payload = r#"{
            "get": "fixtures",
            "parameters": {"team": "131", "league": "71", "last": "5"},
            "response": [
                {
                    "fixture": {"id": 1, "date": "2023-05-15T00:00:00+00:00", "status": {"short": "FT"}},
                    "league": {"id": 71, "season": 2023},
                    "teams": {
                        "home": {"id": 131, "name": "Flamengo", "winner": true},
                        "away": {"id": 134, "name": "Palmeiras", "winner": false}
                    },
                    "goals": {"home": 2, "away": 1},
                    "score": {
                        "halftime": {"home": 1, "away": 0},
                        "fulltime": {"home": 2, "away": 1},
                        "extratime": {"home": null, "away": null}
                    }
                },
                {
                    "fixture": {"id": 2, "date": "2023-05-22T00:00:00+00:00"},
                    "teams": {
                        "home": {"id": 127, "name": "Flamengo B"},
                        "away": {"id": 131, "name": "Flamengo"}
                    },
                    "goals": {"home": null, "away": null}
                }
            ]
        }"#;
        let envelope: Envelope<FixtureEntry> = serde_json::from_str(payload).unwrap();
        let fixtures = parse_fixtures(envelope);

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id, "1");
        assert_eq!(fixtures[0].home.id, "131");
        assert_eq!(fixtures[0].away.name, "Palmeiras");
        assert_eq!(fixtures[0].halftime, Score { home: Some(1), away: Some(0) });
        assert_eq!(fixtures[0].scoreline(), "Flamengo 2 - 1 Palmeiras");
        assert_eq!(fixtures[1].goals, Score::default());
        assert_eq!(fixtures[1].fulltime, Score::default());
        assert!(fixtures[1].involves("131"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let catalog = ApiFootballCatalog::new("https://example.test/v3/", "key", 2023);
        assert_eq!(catalog.base_url, "https://example.test/v3");
        assert_eq!(catalog.season, 2023);
    }
}
