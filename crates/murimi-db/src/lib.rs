//! # murimi-db
//!
//! PostgreSQL persistence layer for the murimi member registry.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for members, cluster leaders, events,
//!   and soil samples
//! - Filesystem-backed file storage for uploaded lab reports
//!
//! ## Example
//!
//! ```rust,ignore
//! use murimi_db::Database;
//! use murimi_core::{CreateMemberRequest, MemberRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/murimi").await?;
//!     let members = db.members.list(&Default::default()).await?;
//!     println!("{} members registered", members.len());
//!     Ok(())
//! }
//! ```

pub mod cluster_leaders;
pub mod events;
pub mod file_storage;
pub mod members;
pub mod pool;
pub mod soil_samples;

// Re-export core types
pub use murimi_core::*;

// Re-export repository implementations
pub use cluster_leaders::PgClusterLeaderRepository;
pub use events::PgEventRepository;
pub use file_storage::{FilesystemBackend, StorageBackend};
pub use members::PgMemberRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use soil_samples::PgSoilSampleRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Member repository for registration CRUD.
    pub members: PgMemberRepository,
    /// Cluster leader repository.
    pub cluster_leaders: PgClusterLeaderRepository,
    /// Calendar event repository.
    pub events: PgEventRepository,
    /// Soil sample repository.
    pub soil_samples: PgSoilSampleRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            members: PgMemberRepository::new(pool.clone()),
            cluster_leaders: PgClusterLeaderRepository::new(pool.clone()),
            events: PgEventRepository::new(pool.clone()),
            soil_samples: PgSoilSampleRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the given URL with the pool configuration read from the
    /// environment (see [`PoolConfig::from_env`]).
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
