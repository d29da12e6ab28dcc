//! Helpers for integration tests that run against a real `PostgreSQL`.
//!
//! Connection settings come from `TEST_DB_*` variables and default to a
//! local `hostel_test` database on port 5433.

use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::{
    entities::{Complaint, User},
    migrations::Migrator,
};

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Where the test database lives.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: env_or("TEST_DB_HOST", "localhost"),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: env_or("TEST_DB_USER", "hostel_test"),
            password: env_or("TEST_DB_PASSWORD", "hostel_test"),
            database: env_or("TEST_DB_NAME", "hostel_test"),
        }
    }
}

impl TestDbConfig {
    fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{database}",
            self.username, self.password, self.host, self.port
        )
    }

    /// URL of the test database itself.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.url_for(&self.database)
    }

    /// URL of the maintenance database, used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        self.url_for("postgres")
    }
}

/// Handle on a test database.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
    config: TestDbConfig,
    owned: bool,
}

impl TestDatabase {
    /// Connect to the shared test database from the environment.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect to the database described by `config`.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
            owned: false,
        })
    }

    /// Shared test database with the schema brought up to date.
    pub async fn migrated() -> Result<Self, DbErr> {
        let db = Self::new().await?;
        Migrator::up(db.connection(), None).await?;
        Ok(db)
    }

    /// Fresh, migrated database under a random name. Drop it with
    /// [`Self::drop_database`].
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("hostel_test_{}", &suffix[..8]);

        let admin = Database::connect(&config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        admin.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;
        info!(database = %config.database, "Created unique test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
            owned: true,
        })
    }

    /// Whether this handle created its database.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.owned
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Shared handle for building repositories.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Remove every complaint and user.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        Complaint::delete_many().exec(self.connection()).await?;
        User::delete_many().exec(self.connection()).await?;
        Ok(())
    }

    /// Drop a database created by [`Self::create_unique`].
    pub async fn drop_database(self) -> Result<(), DbErr> {
        if !self.owned {
            return Err(DbErr::Custom(format!(
                "refusing to drop shared database {}",
                self.config.database
            )));
        }
        // Repositories may still hold clones; FORCE disconnects them.
        if let Ok(conn) = Arc::try_unwrap(self.conn) {
            conn.close().await?;
        }

        let admin = Database::connect(&self.config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!(
                    "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                    self.config.database
                ),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::MockDatabase;

    fn mock_handle() -> TestDatabase {
        TestDatabase {
            conn: Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            config: TestDbConfig::default(),
            owned: false,
        }
    }

    #[test]
    fn test_shared_hands_out_same_connection() {
        let db = mock_handle();
        let a = db.shared();
        let b = db.shared();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(std::ptr::eq(a.as_ref(), db.connection()));
    }

    #[tokio::test]
    async fn test_shared_database_is_never_dropped() {
        let db = mock_handle();
        assert!(!db.is_unique());

        let result = db.drop_database().await;
        assert!(matches!(result, Err(DbErr::Custom(_))));
    }

    #[test]
    fn test_urls() {
        let config = TestDbConfig {
            host: "db".to_string(),
            port: 5433,
            username: "user".to_string(),
            password: "pass".to_string(),
            database: "complaints".to_string(),
        };
        assert_eq!(config.database_url(), "postgres://user:pass@db:5433/complaints");
        assert_eq!(config.postgres_url(), "postgres://user:pass@db:5433/postgres");
    }
}
