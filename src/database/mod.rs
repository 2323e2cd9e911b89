use anyhow::Result;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};

use crate::config::DatabaseConfig;

/// MySQL connection pool owner for the drop-repo service.
///
/// Constructed once at startup and injected into the repository; the pool is
/// shared across all request-handling tasks and acquisition is scoped per
/// query by sqlx.
#[derive(Clone)]
pub struct Database {
    pool: Pool<MySql>,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(5))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Build the pool without touching the server; connections are
    /// established on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(5))
            .connect_lazy(&config.url)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> Pool<MySql> {
        self.pool.clone()
    }

    /// Create the drop table when it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS drop_data (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                dropperid BIGINT NOT NULL,
                itemid BIGINT NOT NULL,
                minimum_quantity BIGINT NOT NULL,
                maximum_quantity BIGINT NOT NULL,
                questid BIGINT NOT NULL,
                chance BIGINT NOT NULL,
                INDEX idx_drop_data_dropperid (dropperid),
                INDEX idx_drop_data_itemid (itemid)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cheap liveness probe used by the readiness endpoint.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
