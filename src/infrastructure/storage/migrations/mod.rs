//! Schema migrations for the user store
//!
//! Applied versions are tracked in `_migrations`. Each step runs its SQL and
//! its bookkeeping row change in one transaction.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::domain::DomainError;

const CREATE_LEDGER: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version BIGINT PRIMARY KEY,
        description TEXT NOT NULL,
        installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        success BOOLEAN NOT NULL DEFAULT TRUE
    )
"#;

/// Known schema steps, ascending by version
pub const USER_STORE_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Create user table",
    up: r#"
        CREATE TABLE IF NOT EXISTS _user (
            usr_id BIGSERIAL PRIMARY KEY,
            usr_name TEXT NOT NULL,
            usr_surname TEXT NOT NULL,
            usr_birth_date DATE
        );
    "#,
    down: "DROP TABLE IF EXISTS _user;",
}];

/// Schema management seam used by the CLI
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Apply every pending migration in order
    async fn run(&self) -> Result<(), DomainError>;

    /// Undo the latest applied migration, if any
    async fn revert(&self) -> Result<(), DomainError>;

    /// Latest applied version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// A single schema step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Migrator backed by a PostgreSQL pool
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: &'static [Migration],
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, USER_STORE_MIGRATIONS)
    }

    pub fn with_migrations(pool: PgPool, migrations: &'static [Migration]) -> Self {
        Self { pool, migrations }
    }

    async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        sqlx::raw_sql(CREATE_LEDGER)
            .execute(&self.pool)
            .await
            .map_err(storage_error("create migration ledger"))?;

        sqlx::query_scalar::<_, i64>("SELECT version FROM _migrations WHERE success ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("read migration ledger"))
    }

    async fn step(&self, migration: &Migration, direction: Direction) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("open migration transaction"))?;

        let (sql, ledger) = match direction {
            Direction::Up => (
                migration.up,
                "INSERT INTO _migrations (version, description) VALUES ($1, $2)",
            ),
            Direction::Down => (
                migration.down,
                "DELETE FROM _migrations WHERE version = $1 AND description = $2",
            ),
        };

        // Unbound SQL uses the simple query protocol, which accepts several statements
        sqlx::Executor::execute(&mut *tx, sql)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Migration {} ({:?}) failed: {}",
                    migration.version, direction, e
                ))
            })?;

        sqlx::query(ledger)
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(storage_error("update migration ledger"))?;

        tx.commit()
            .await
            .map_err(storage_error("commit migration"))?;

        info!(
            version = migration.version,
            description = migration.description,
            direction = ?direction,
            "Migration step finished"
        );

        Ok(())
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<(), DomainError> {
        let applied = self.applied_versions().await?;
        let pending = pending(self.migrations, &applied);

        if pending.is_empty() {
            debug!("Schema is up to date");
        }

        for migration in pending {
            self.step(migration, Direction::Up).await?;
        }

        Ok(())
    }

    async fn revert(&self) -> Result<(), DomainError> {
        let Some(latest) = self.applied_versions().await?.last().copied() else {
            debug!("Nothing to revert");
            return Ok(());
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == latest)
            .ok_or_else(|| {
                DomainError::storage(format!("Applied migration {} is unknown to this build", latest))
            })?;

        self.step(migration, Direction::Down).await
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        Ok(self.applied_versions().await?.last().copied())
    }
}

/// Migrations not yet recorded as applied, in version order
fn pending<'m>(migrations: &'m [Migration], applied: &[i64]) -> Vec<&'m Migration> {
    let mut pending: Vec<&Migration> = migrations
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();

    pending.sort_by_key(|m| m.version);
    pending
}

fn storage_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::storage(format!("Failed to {}: {}", context, e))
}

/// Bring the user store schema up to date
pub async fn run_storage_migrations(pool: &PgPool) -> Result<(), DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS: &[Migration] = &[
        Migration {
            version: 2,
            description: "second",
            up: "SELECT 2",
            down: "SELECT 2",
        },
        Migration {
            version: 1,
            description: "first",
            up: "SELECT 1",
            down: "SELECT 1",
        },
        Migration {
            version: 3,
            description: "third",
            up: "SELECT 3",
            down: "SELECT 3",
        },
    ];

    #[test]
    fn test_versions_are_ascending() {
        for pair in USER_STORE_MIGRATIONS.windows(2) {
            assert!(pair[1].version > pair[0].version);
        }
    }

    #[test]
    fn test_user_table_migration() {
        let first = &USER_STORE_MIGRATIONS[0];

        assert_eq!(first.version, 1);
        assert!(first.up.contains("CREATE TABLE IF NOT EXISTS _user"));
        assert!(first.up.contains("usr_birth_date DATE"));
        assert!(first.down.contains("DROP TABLE IF EXISTS _user"));
    }

    #[test]
    fn test_pending_skips_applied_and_sorts() {
        let versions: Vec<i64> = pending(STEPS, &[2]).iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 3]);
    }

    #[test]
    fn test_nothing_pending_when_all_applied() {
        assert!(pending(STEPS, &[1, 2, 3]).is_empty());
    }

    fn assert_send<T: Send>(_: T) {}

    #[tokio::test]
    async fn test_migration_futures_are_send() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/cronos")
            .unwrap();
        let migrator = PostgresMigrator::new(pool);

        assert_send(migrator.step(&USER_STORE_MIGRATIONS[0], Direction::Up));
        assert_send(migrator.step(&USER_STORE_MIGRATIONS[0], Direction::Down));
        assert_send(migrator.run());
        assert_send(migrator.revert());
    }

    #[test]
    fn test_storage_error_keeps_context() {
        let err = storage_error("read migration ledger")(sqlx::Error::RowNotFound);
        assert!(err.to_string().contains("read migration ledger"));
    }
}
