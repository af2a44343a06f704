use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::error::AnalysisError;
use crate::models::AnalysisReport;
use crate::services::{AnalysisEngine, AnalysisSession, Catalog, Command, Options, Renderer};
use crate::utils::resolve_team;

pub async fn show_leagues(catalog: Arc<dyn Catalog>) -> Result<()> {
    println!("🏆 Available Leagues:\n");

    let leagues = catalog.list_leagues().await?;
    if leagues.is_empty() {
        println!("📭 No leagues found. Try: matchup-analyzer init-db --catalog sqlite");
        return Ok(());
    }

    for league in leagues {
        println!("   • [{}] {}", league.id, league.label());
    }

    println!("\n💡 Use 'matchup-analyzer teams --league <id>' to list a league's teams");
    Ok(())
}

pub async fn show_teams(catalog: Arc<dyn Catalog>, league_id: &str) -> Result<()> {
    let teams = catalog.list_teams(league_id).await?;

    if teams.is_empty() {
        println!("❌ No teams found for league '{}'", league_id);
        return Ok(());
    }

    println!("📋 Teams in league {}:\n", league_id);
    for team in teams {
        match team.short_name {
            Some(short) => println!("   • [{}] {} ({})", team.id, team.name, short),
            None => println!("   • [{}] {}", team.id, team.name),
        }
    }

    Ok(())
}

pub async fn show_matches(
    catalog: Arc<dyn Catalog>,
    league_id: &str,
    team: &str,
    last: u32,
) -> Result<()> {
    let teams = catalog.list_teams(league_id).await?;
    let team = resolve_team(&teams, team)
        .ok_or_else(|| anyhow!("No team matching '{}' in league {}", team, league_id))?;

    let matches = catalog.last_matches(&team.id, league_id, last).await?;
    if matches.is_empty() {
        println!("📭 No finished matches found for {}", team.name);
        return Ok(());
    }

    println!("📅 Last {} matches of {}:\n", matches.len(), team.name);
    for fixture in matches {
        println!("   {}  {}", fixture.date, fixture.scoreline());
    }

    Ok(())
}

pub struct AnalyzeArgs<'a> {
    pub league: &'a str,
    pub home: &'a str,
    pub away: &'a str,
    pub seed: Option<u64>,
    pub json: bool,
}

/// Drive the analysis form from the command line: pick league, pick teams, analyse.
pub async fn analyze(
    catalog: Arc<dyn Catalog>,
    engine: Arc<AnalysisEngine>,
    renderer: Renderer,
    args: AnalyzeArgs<'_>,
) -> Result<()> {
    let mut session = AnalysisSession::new(catalog, engine);
    session.open().await;

    if let Options::Failed(placeholder) = session.leagues() {
        return Err(anyhow!("{}", placeholder));
    }
    let league_id = session
        .leagues()
        .items()
        .iter()
        .find(|l| l.id == args.league || l.name.eq_ignore_ascii_case(args.league))
        .map(|l| l.id.clone())
        .ok_or_else(|| AnalysisError::UnknownLeague(args.league.to_string()))?;

    session.handle(Command::SelectLeague(Some(league_id))).await?;
    if let Options::Failed(placeholder) = session.teams() {
        return Err(anyhow!("{}", placeholder));
    }

    let teams = session.teams().items().to_vec();
    let home = resolve_team(&teams, args.home)
        .ok_or_else(|| anyhow!("No team matching '{}'", args.home))?;
    let away = resolve_team(&teams, args.away)
        .ok_or_else(|| anyhow!("No team matching '{}'", args.away))?;

    session.handle(Command::SelectHomeTeam(Some(home.id.clone()))).await?;
    session.handle(Command::SelectAwayTeam(Some(away.id.clone()))).await?;

    if let Err(e) = session.handle(Command::Analyze { seed: args.seed }).await {
        if let Some(notice) = session.notice() {
            println!("❌ {}", notice);
        }
        return Err(e.into());
    }

    let report = session
        .last_report()
        .ok_or_else(|| anyhow!("analysis produced no report"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(&renderer, report);
    }

    Ok(())
}

fn print_report(renderer: &Renderer, report: &AnalysisReport) {
    let stats = &report.statistics;
    println!("⚽ {} vs {}\n", stats.home_team, stats.away_team);

    for card in renderer.stat_cards(stats) {
        println!("   {:<32} {:>6}", card.label, card.value);
    }
    println!();

    for line in renderer.render_recommendation(&report.recommendation) {
        println!("{}", line);
    }

    println!("\n🎲 Seed: {} (pass --seed {} to reproduce)", report.seed, report.seed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Language, MockCatalog, SynthesisMode};
    use chrono::FixedOffset;

    fn fixtures() -> (Arc<dyn Catalog>, Arc<AnalysisEngine>, Renderer) {
        (
            Arc::new(MockCatalog::default()),
            Arc::new(AnalysisEngine::with_mode(SynthesisMode::Faithful).unwrap()),
            Renderer::new(Language::English, FixedOffset::east_opt(0).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_analyze_by_names() {
        let (catalog, engine, renderer) = fixtures();
        let args = AnalyzeArgs {
            league: "Premier League",
            home: "liverpool",
            away: "Man City",
            seed: Some(3),
            json: true,
        };
        // "Man City" is not close enough to "Manchester City" for any matcher.
        assert!(analyze(catalog, engine, renderer, args).await.is_err());

        let (catalog, engine, renderer) = fixtures();
        let args = AnalyzeArgs {
            league: "39",
            home: "liverpool",
            away: "manchester",
            seed: Some(3),
            json: true,
        };
        assert!(analyze(catalog, engine, renderer, args).await.is_ok());
    }

    #[tokio::test]
    async fn test_show_matches_resolves_team_name() {
        let (catalog, _, _) = fixtures();
        assert!(show_matches(catalog.clone(), "71", "palmeiras", 5).await.is_ok());

        let err = show_matches(catalog, "39", "Palmeiras", 5).await.unwrap_err();
        assert!(err.to_string().contains("No team matching 'Palmeiras'"));
    }

    #[tokio::test]
    async fn test_unknown_league() {
        let (catalog, engine, renderer) = fixtures();
        let args = AnalyzeArgs {
            league: "Serie B",
            home: "Flamengo",
            away: "Palmeiras",
            seed: None,
            json: false,
        };
        let err = analyze(catalog, engine, renderer, args).await.unwrap_err();
        assert!(err.to_string().contains("unknown league: Serie B"));
    }
}
