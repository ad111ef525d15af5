//! Migrate command - manages the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{Migrator, PostgresMigrator};

/// Arguments for the migrate command
#[derive(Args, Debug, Clone, Default)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

/// Run the migrate command against the configured database
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let pool = crate::connect_postgres(&config.storage).await?;
    let migrator = PostgresMigrator::new(pool);

    apply(&migrator, &args).await?;

    match migrator.version().await? {
        Some(version) => info!(version, "Schema version"),
        None => info!("No migrations applied"),
    }

    Ok(())
}

async fn apply(migrator: &dyn Migrator, args: &MigrateArgs) -> anyhow::Result<()> {
    if args.revert {
        info!("Reverting latest migration");
        migrator.revert().await?;
    } else {
        info!("Applying pending migrations");
        migrator.run().await?;
    }

    Ok(())
}
