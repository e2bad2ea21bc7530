//! Database module wiring for the service container
//!
//! Mirrors an async module factory: the factory receives the
//! [`ConfigService`] resolved from the container, returns a descriptor, and
//! the resulting connection is registered back as a singleton.

use tracing::info;

use crate::config::ConfigService;
use crate::container::Container;
use crate::database::config::ConnectionDescriptor;
use crate::database::{Connector, DataSource};
use crate::error::FrameworkError;

/// Entity globs used by the URL-based module configuration
pub const MODULE_SCHEMA_LOCATIONS: &[&str] = &["../**/*.entity.js"];

/// Registers a database connection in a [`Container`]
pub struct DatabaseModule;

impl DatabaseModule {
    /// Build a descriptor from the container's config and connect it
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::ServiceNotFound`] when no [`ConfigService`]
    /// is registered, or whatever the factory or connector reports. Nothing
    /// is registered on failure.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut container = Container::new();
    /// container.singleton(ConfigService::load(Path::new(".")));
    ///
    /// DatabaseModule::for_root_async(&mut container, &SeaOrmConnector, DatabaseModule::url_factory).await?;
    /// let conn: DbConnection = container.resolve()?;
    /// ```
    pub async fn for_root_async<C, F>(
        container: &mut Container,
        connector: &C,
        factory: F,
    ) -> Result<(), FrameworkError>
    where
        C: Connector,
        C::Connection: Clone + Send + Sync + 'static,
        F: FnOnce(&ConfigService) -> Result<ConnectionDescriptor, FrameworkError>,
    {
        let config = container.resolve::<ConfigService>()?;
        let descriptor = factory(&config)?;

        let connection = DataSource::new(descriptor).initialize(connector).await?;
        container.singleton(connection);
        info!("Database module registered");
        Ok(())
    }

    /// The URL factory: TLS on, entities next to the compiled module
    ///
    /// `DATABASE_URL` is read as-is. When it is missing the URL is left
    /// empty and the driver rejects it on connect.
    pub fn url_factory(config: &ConfigService) -> Result<ConnectionDescriptor, FrameworkError> {
        ConnectionDescriptor::builder()
            .url(config.get::<String>("DATABASE_URL").unwrap_or_default())
            .use_tls(true)
            .enable_query_logging(false)
            .schema_locations(MODULE_SCHEMA_LOCATIONS.iter().copied())
            .migration_locations(Vec::<String>::new())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvSnapshot;
    use crate::database::tests::ScriptedConnector;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    fn config(pairs: &[(&str, &str)]) -> ConfigService {
        ConfigService::new(EnvSnapshot::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_url_factory_shape() {
        let d = DatabaseModule::url_factory(&config(&[("DATABASE_URL", "postgres://u:p@h/db")])).unwrap();

        assert_eq!(d.connection_url(), Some("postgres://u:p@h/db"));
        assert!(d.use_tls());
        assert_eq!(d.schema_locations(), ["../**/*.entity.js"]);
        assert!(d.migration_locations().is_empty());
        assert!(!d.auto_synchronize_schema());
    }

    #[test]
    fn test_url_factory_does_not_validate_missing_url() {
        let d = DatabaseModule::url_factory(&config(&[])).unwrap();

        assert_eq!(d.connection_url(), Some(""));
    }

    #[tokio::test]
    async fn test_registers_connection_singleton() {
        let mut container = Container::new();
        container.singleton(config(&[("DATABASE_URL", "postgres://u:p@h/db")]));
        let connector = ScriptedConnector::succeeding();

        DatabaseModule::for_root_async(&mut container, &connector, DatabaseModule::url_factory)
            .await
            .unwrap();

        let registered: ConnectionDescriptor = container.resolve().unwrap();
        assert_eq!(registered.connection_url(), Some("postgres://u:p@h/db"));
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_requires_config_service() {
        let mut container = Container::new();
        let connector = ScriptedConnector::succeeding();

        let err = DatabaseModule::for_root_async(&mut container, &connector, DatabaseModule::url_factory)
            .await
            .unwrap_err();

        assert!(matches!(err, FrameworkError::ServiceNotFound { .. }));
        assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connection_failure_registers_nothing() {
        let mut container = Container::new();
        container.singleton(config(&[]));
        let connector = ScriptedConnector::failing(FrameworkError::database("refused"));

        let err = DatabaseModule::for_root_async(&mut container, &connector, DatabaseModule::url_factory)
            .await
            .unwrap_err();

        assert_eq!(err, FrameworkError::database("refused"));
        assert!(!container.has::<ConnectionDescriptor>());
    }
}
