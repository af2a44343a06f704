use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};

use crate::db::{self, SqliteCatalog, DEFAULT_DATABASE_URL};
use crate::error::AnalysisResult;
use crate::services::{
    api_football, AnalysisEngine, ApiFootballCatalog, Catalog, FixedClock, Language, MockCatalog,
    SynthesisMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogSource {
    /// Built-in leagues and teams
    Mock,
    /// `leagues` / `teams` tables of the SQLite database
    Sqlite,
    /// API-Football over RapidAPI
    ApiFootball,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct AppConfig {
    /// Where leagues and teams come from
    #[arg(long, env = "CATALOG", value_enum, default_value = "mock", global = true)]
    pub catalog: CatalogSource,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    pub database_url: String,

    /// Language of rendered recommendations and stat cards
    #[arg(long, env = "ANALYSIS_LANGUAGE", value_enum, default_value = "en", global = true)]
    pub language: Language,

    /// Independent sampling (faithful) or internally consistent statistics (coherent)
    #[arg(long, env = "SYNTHESIS_MODE", value_enum, default_value = "faithful", global = true)]
    pub synthesis_mode: SynthesisMode,

    /// API-Football (RapidAPI) key, required with --catalog api-football
    #[arg(long, env = "API_FOOTBALL_KEY", global = true)]
    pub api_football_key: Option<String>,

    /// API-Football base URL
    #[arg(
        long,
        env = "API_FOOTBALL_URL",
        default_value = api_football::DEFAULT_BASE_URL,
        global = true
    )]
    pub api_football_url: String,

    /// Season used when listing API-Football teams
    #[arg(long, env = "API_FOOTBALL_SEASON", default_value = "2023", global = true)]
    pub api_football_season: u16,

    /// Pin recommendation timestamps (RFC 3339); with --seed the whole report is reproducible
    #[arg(long, env = "ANALYSIS_TIME", global = true)]
    pub fixed_time: Option<DateTime<Utc>>,
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog == CatalogSource::ApiFootball
            && self.api_football_key.as_deref().map_or(true, |key| key.trim().is_empty())
        {
            anyhow::bail!("API_FOOTBALL_KEY is required with --catalog api-football");
        }
        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!("DATABASE_URL must be a sqlite: URL, got {}", self.database_url);
        }
        Ok(())
    }

    pub fn build_engine(&self) -> AnalysisResult<AnalysisEngine> {
        let engine = AnalysisEngine::with_mode(self.synthesis_mode)?;
        Ok(match self.fixed_time {
            Some(at) => engine.with_clock(Arc::new(FixedClock(at))),
            None => engine,
        })
    }

    pub async fn build_catalog(&self) -> anyhow::Result<Arc<dyn Catalog>> {
        let catalog: Arc<dyn Catalog> = match self.catalog {
            CatalogSource::Mock => Arc::new(MockCatalog::default()),
            CatalogSource::Sqlite => {
                let pool = db::create_pool(&self.database_url).await?;
                db::init_database_with_pool(&pool).await?;
                db::seed_data(&pool).await?;
                Arc::new(SqliteCatalog::new(pool))
            }
            CatalogSource::ApiFootball => {
                let key = self.api_football_key.clone().unwrap_or_default();
                Arc::new(ApiFootballCatalog::new(
                    self.api_football_url.clone(),
                    key,
                    self.api_football_season,
                ))
            }
        };
        tracing::info!("Using {:?} catalog", self.catalog);
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: AppConfig,
    }

    fn parse(args: &[&str]) -> AppConfig {
        let mut argv = vec!["matchup-analyzer"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).config
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[
            "--catalog",
            "mock",
            "--language",
            "en",
            "--synthesis-mode",
            "faithful",
        ]);
        assert_eq!(config.catalog, CatalogSource::Mock);
        assert_eq!(config.language, Language::English);
        assert_eq!(config.synthesis_mode, SynthesisMode::Faithful);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_portuguese_and_coherent_flags() {
        let config = parse(&["--language", "pt-br", "--synthesis-mode", "coherent"]);
        assert_eq!(config.language, Language::Portuguese);
        assert_eq!(config.synthesis_mode, SynthesisMode::Coherent);
    }

    #[test]
    fn test_api_football_needs_key() {
        let mut config = parse(&["--catalog", "api-football"]);
        config.api_football_key = None;
        assert!(config.validate().is_err());

        config.api_football_key = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_sqlite_url() {
        let config = parse(&["--catalog", "mock", "--database-url", "postgres://localhost/db"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fixed_time_pins_timestamps() {
        let config = parse(&["--fixed-time", "2026-03-01T20:00:00Z"]);
        let engine = config.build_engine().unwrap();
        let report = engine.analyze("Liverpool", "Manchester City", Some(1));
        assert_eq!(report.recommendation.generated_at.to_rfc3339(), "2026-03-01T20:00:00+00:00");
    }

    #[tokio::test]
    async fn test_mock_catalog_built() {
        let config = parse(&["--catalog", "mock"]);
        let catalog = config.build_catalog().await.unwrap();
        assert_eq!(catalog.list_leagues().await.unwrap().len(), 2);
    }
}
