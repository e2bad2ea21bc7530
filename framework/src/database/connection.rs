//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tracing::debug;

use crate::database::config::ConnectionDescriptor;
use crate::error::FrameworkError;

/// Wrapper around SeaORM's DatabaseConnection
///
/// This provides a clonable, thread-safe connection that can be stored
/// in the service container and shared.
///
/// # Example
///
/// ```rust,ignore
/// let conn = DbConnection::connect(&descriptor).await?;
///
/// // Use with SeaORM queries
/// let users = User::find().all(conn.inner()).await?;
/// ```
#[derive(Clone)]
pub struct DbConnection {
    inner: Arc<DatabaseConnection>,
}

impl DbConnection {
    /// Open a connection pool described by `descriptor`
    ///
    /// Pool sizing and timeouts are left at SeaORM's defaults.
    pub async fn connect(descriptor: &ConnectionDescriptor) -> Result<Self, FrameworkError> {
        let url = descriptor.to_url()?;
        debug!(driver = %descriptor.driver(), tls = descriptor.use_tls(), "Opening database connection");

        let mut opt = ConnectOptions::new(url);
        opt.sqlx_logging(descriptor.enable_query_logging());

        let conn = Database::connect(opt).await?;

        Ok(Self {
            inner: Arc::new(conn),
        })
    }

    /// Get a reference to the underlying SeaORM connection
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }
}

impl AsRef<DatabaseConnection> for DbConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

impl std::ops::Deref for DbConnection {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_unusable_url() {
        let descriptor = ConnectionDescriptor::builder().url("").build().unwrap();

        let err = DbConnection::connect(&descriptor).await.unwrap_err();

        assert!(matches!(err, FrameworkError::Database(_)));
    }
}
