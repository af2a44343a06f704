use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::{insert_league, insert_match, insert_team};
use crate::services::MockCatalog;

/// Loads the built-in catalog into an empty database.
pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leagues")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already seeded ({} leagues found), skipping.", count);
        return Ok(());
    }

    tracing::info!("Seeding database with the built-in league catalog...");

    let catalog = MockCatalog::default();
    for league in catalog.leagues() {
        insert_league(pool, league).await?;
        for team in catalog.teams(&league.id) {
            insert_team(pool, &league.id, team).await?;
        }
        for fixture in catalog.fixtures(&league.id) {
            insert_match(pool, &league.id, fixture).await?;
        }
    }

    tracing::info!("Database seeded successfully.");
    Ok(())
}
