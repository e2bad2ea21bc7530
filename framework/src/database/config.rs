//! Connection descriptor and its resolution from the environment
//!
//! A [`ConnectionDescriptor`] is built once at startup and never mutated. It
//! either names a single connection URL or individual host/port/credential
//! parameters, never both.

use serde::Serialize;
use std::net::IpAddr;
use url::Url;

use crate::config::EnvSnapshot;
use crate::error::FrameworkError;

/// Host used when `DB_HOST` is not set
pub const DEFAULT_HOST: &str = "localhost";

/// Port used when `DB_PORT` is not set or does not parse
pub const DEFAULT_PORT: u16 = 52674;

/// Entity globs relative to the source tree
pub const SOURCE_SCHEMA_LOCATIONS: &[&str] = &["src/**/*.entity{.ts,.js}"];

/// Entity globs relative to compiled output
pub const DIST_SCHEMA_LOCATIONS: &[&str] = &["dist/src/**/*.entity{.ts,.js}"];

/// Migration globs, identical in both build modes
pub const MIGRATION_LOCATIONS: &[&str] = &["migrations/**/*.{ts,js}"];

const REDACTED: &str = "********";

/// Supported database drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DatabaseDriver {
    Postgres,
}

impl DatabaseDriver {
    /// URL scheme for this driver
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
        }
    }
}

impl std::fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Which set of schema globs the descriptor points at
///
/// Chosen at compile time: the `dist` feature selects [`BuildMode::Distribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Development: entities are read from the source tree
    Source,
    /// Entities are read from compiled output
    Distribution,
}

impl BuildMode {
    /// The build mode this crate was compiled with
    pub fn current() -> Self {
        if cfg!(feature = "dist") {
            Self::Distribution
        } else {
            Self::Source
        }
    }

    /// Entity globs for this mode
    pub fn schema_locations(&self) -> Vec<String> {
        let globs = match self {
            Self::Source => SOURCE_SCHEMA_LOCATIONS,
            Self::Distribution => DIST_SCHEMA_LOCATIONS,
        };
        to_strings(globs)
    }

    /// Migration globs for this mode
    pub fn migration_locations(&self) -> Vec<String> {
        to_strings(MIGRATION_LOCATIONS)
    }
}

fn to_strings(globs: &[&str]) -> Vec<String> {
    globs.iter().map(|g| g.to_string()).collect()
}

/// Where to connect: either one URL or individual parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ConnectionTarget {
    Params {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        database: Option<String>,
    },
    Url {
        url: String,
    },
}

/// The resolved set of parameters needed to open a database connection
///
/// # Example
///
/// ```
/// use datasource::config::EnvSnapshot;
/// use datasource::database::{BuildMode, ConnectionDescriptor};
///
/// let vars = EnvSnapshot::from_pairs([("DB_USER", "a"), ("DB_PASSWORD", "b"), ("DB_NAME", "c")]);
/// let descriptor = ConnectionDescriptor::resolve(&vars, BuildMode::Source);
///
/// assert_eq!(descriptor.host(), Some("localhost"));
/// assert_eq!(descriptor.port(), Some(52674));
/// assert_eq!(descriptor.connection_url(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    driver: DatabaseDriver,
    #[serde(flatten)]
    target: ConnectionTarget,
    use_tls: bool,
    enable_query_logging: bool,
    schema_locations: Vec<String>,
    migration_locations: Vec<String>,
    subscriber_locations: Vec<String>,
    auto_synchronize_schema: bool,
}

impl ConnectionDescriptor {
    /// Resolve a descriptor for the compiled-in [`BuildMode`]
    pub fn from_env(vars: &EnvSnapshot) -> Self {
        Self::resolve(vars, BuildMode::current())
    }

    /// Resolve a descriptor from `vars`
    ///
    /// `DATABASE_URL`, when present, wins and leaves every individual field
    /// empty. Otherwise `DB_USER`, `DB_PASSWORD` and `DB_NAME` are copied
    /// verbatim and host/port fall back to `localhost:52674`. Nothing is
    /// validated here; the driver rejects what it cannot use.
    pub fn resolve(vars: &EnvSnapshot, mode: BuildMode) -> Self {
        let target = match vars.raw("DATABASE_URL") {
            Some(url) => ConnectionTarget::Url {
                url: url.to_string(),
            },
            None => ConnectionTarget::Params {
                host: vars.get("DB_HOST", DEFAULT_HOST.to_string()),
                port: vars.get("DB_PORT", DEFAULT_PORT),
                username: vars.optional("DB_USER"),
                password: vars.optional("DB_PASSWORD"),
                database: vars.optional("DB_NAME"),
            },
        };

        Self {
            driver: DatabaseDriver::Postgres,
            use_tls: vars.get_bool("DB_SSL").unwrap_or(false),
            enable_query_logging: vars.get_bool("DB_LOGGING").unwrap_or(true),
            target,
            schema_locations: mode.schema_locations(),
            migration_locations: mode.migration_locations(),
            subscriber_locations: Vec::new(),
            auto_synchronize_schema: false,
        }
    }

    /// Create a builder for an explicit descriptor
    pub fn builder() -> ConnectionDescriptorBuilder {
        ConnectionDescriptorBuilder::default()
    }

    pub fn driver(&self) -> DatabaseDriver {
        self.driver
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn host(&self) -> Option<&str> {
        match &self.target {
            ConnectionTarget::Params { host, .. } => Some(host),
            ConnectionTarget::Url { .. } => None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        match &self.target {
            ConnectionTarget::Params { port, .. } => Some(*port),
            ConnectionTarget::Url { .. } => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match &self.target {
            ConnectionTarget::Params { username, .. } => username.as_deref(),
            ConnectionTarget::Url { .. } => None,
        }
    }

    pub fn password(&self) -> Option<&str> {
        match &self.target {
            ConnectionTarget::Params { password, .. } => password.as_deref(),
            ConnectionTarget::Url { .. } => None,
        }
    }

    pub fn database(&self) -> Option<&str> {
        match &self.target {
            ConnectionTarget::Params { database, .. } => database.as_deref(),
            ConnectionTarget::Url { .. } => None,
        }
    }

    /// The single connection URL, when configured in URL mode
    pub fn connection_url(&self) -> Option<&str> {
        match &self.target {
            ConnectionTarget::Url { url } => Some(url),
            ConnectionTarget::Params { .. } => None,
        }
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    pub fn enable_query_logging(&self) -> bool {
        self.enable_query_logging
    }

    pub fn schema_locations(&self) -> &[String] {
        &self.schema_locations
    }

    pub fn migration_locations(&self) -> &[String] {
        &self.migration_locations
    }

    pub fn subscriber_locations(&self) -> &[String] {
        &self.subscriber_locations
    }

    /// Always `false`: schema changes go through migrations only
    pub fn auto_synchronize_schema(&self) -> bool {
        self.auto_synchronize_schema
    }

    /// The URL handed to the driver
    ///
    /// A URL target is passed through; one that does not parse is returned
    /// untouched for the driver to reject. Parameters are assembled into a
    /// URL with percent-encoded credentials. With TLS enabled and no explicit
    /// `sslmode`, `sslmode=require` is appended.
    pub fn to_url(&self) -> Result<String, FrameworkError> {
        let mut url = match &self.target {
            ConnectionTarget::Url { url } => match Url::parse(url) {
                Ok(parsed) => parsed,
                Err(_) => return Ok(url.clone()),
            },
            ConnectionTarget::Params {
                host,
                port,
                username,
                password,
                database,
            } => self.params_url(host, *port, username, password, database)?,
        };

        if self.use_tls && !url.query_pairs().any(|(key, _)| key == "sslmode") {
            url.query_pairs_mut().append_pair("sslmode", "require");
        }

        Ok(url.into())
    }

    fn params_url(
        &self,
        host: &str,
        port: u16,
        username: &Option<String>,
        password: &Option<String>,
        database: &Option<String>,
    ) -> Result<Url, FrameworkError> {
        let invalid = |what: &str| FrameworkError::invalid_descriptor(format!("invalid {}", what));

        let authority = match host.parse::<IpAddr>() {
            Ok(IpAddr::V6(addr)) => format!("[{}]", addr),
            _ => host.to_string(),
        };
        let mut url = Url::parse(&format!("{}://{}", self.driver.scheme(), authority))
            .map_err(|e| FrameworkError::invalid_descriptor(format!("invalid host '{}': {}", host, e)))?;
        url.set_port(Some(port)).map_err(|_| invalid("port"))?;
        if let Some(username) = username {
            url.set_username(username).map_err(|_| invalid("username"))?;
        }
        if let Some(password) = password {
            url.set_password(Some(password))
                .map_err(|_| invalid("password"))?;
        }
        if let Some(database) = database {
            url.set_path(&format!("/{}", database));
        }
        Ok(url)
    }

    /// A copy with every password masked, for display and logs
    pub fn redacted(&self) -> Self {
        let target = match &self.target {
            ConnectionTarget::Params {
                host,
                port,
                username,
                password,
                database,
            } => ConnectionTarget::Params {
                host: host.clone(),
                port: *port,
                username: username.clone(),
                password: password.as_ref().map(|_| REDACTED.to_string()),
                database: database.clone(),
            },
            ConnectionTarget::Url { url } => ConnectionTarget::Url {
                url: redact_url(url),
            },
        };

        Self {
            target,
            ..self.clone()
        }
    }
}

fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return REDACTED.to_string();
    };
    if url.password().is_some() && url.set_password(Some(REDACTED)).is_err() {
        return REDACTED.to_string();
    }
    url.into()
}

/// Builder for an explicit ConnectionDescriptor
///
/// Exactly one of [`url`](Self::url) or the individual parameters must be
/// supplied.
#[derive(Debug, Default)]
pub struct ConnectionDescriptorBuilder {
    url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
    use_tls: Option<bool>,
    enable_query_logging: Option<bool>,
    schema_locations: Option<Vec<String>>,
    migration_locations: Option<Vec<String>>,
    subscriber_locations: Option<Vec<String>>,
}

impl ConnectionDescriptorBuilder {
    /// Connect through a single URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Enable TLS (default: off)
    pub fn use_tls(mut self, enabled: bool) -> Self {
        self.use_tls = Some(enabled);
        self
    }

    /// Enable ORM query logging (default: on)
    pub fn enable_query_logging(mut self, enabled: bool) -> Self {
        self.enable_query_logging = Some(enabled);
        self
    }

    pub fn schema_locations<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema_locations = Some(globs.into_iter().map(Into::into).collect());
        self
    }

    pub fn migration_locations<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.migration_locations = Some(globs.into_iter().map(Into::into).collect());
        self
    }

    pub fn subscriber_locations<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscriber_locations = Some(globs.into_iter().map(Into::into).collect());
        self
    }

    /// Build the descriptor
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::InvalidDescriptor`] when both a URL and
    /// individual parameters were given, or neither.
    pub fn build(self) -> Result<ConnectionDescriptor, FrameworkError> {
        let has_params = self.host.is_some()
            || self.port.is_some()
            || self.username.is_some()
            || self.password.is_some()
            || self.database.is_some();

        let target = match (self.url, has_params) {
            (Some(_), true) => {
                return Err(FrameworkError::invalid_descriptor(
                    "a connection URL and individual parameters are mutually exclusive",
                ))
            }
            (None, false) => {
                return Err(FrameworkError::invalid_descriptor(
                    "either a connection URL or connection parameters are required",
                ))
            }
            (Some(url), false) => ConnectionTarget::Url { url },
            (None, true) => ConnectionTarget::Params {
                host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: self.port.unwrap_or(DEFAULT_PORT),
                username: self.username,
                password: self.password,
                database: self.database,
            },
        };

        let mode = BuildMode::current();
        Ok(ConnectionDescriptor {
            driver: DatabaseDriver::Postgres,
            use_tls: self.use_tls.unwrap_or(false),
            enable_query_logging: self.enable_query_logging.unwrap_or(true),
            target,
            schema_locations: self
                .schema_locations
                .unwrap_or_else(|| mode.schema_locations()),
            migration_locations: self
                .migration_locations
                .unwrap_or_else(|| mode.migration_locations()),
            subscriber_locations: self.subscriber_locations.unwrap_or_default(),
            auto_synchronize_schema: false,
        })
    }
}
