use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::FrameworkError;

/// Environment type enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
    Testing,
    Custom(String),
}

impl Environment {
    /// Detect environment from APP_ENV in the given snapshot or default to Local
    pub fn detect_from(vars: &EnvSnapshot) -> Self {
        match vars.raw("APP_ENV") {
            Some("production") => Self::Production,
            Some("staging") => Self::Staging,
            Some("development") => Self::Development,
            Some("testing") => Self::Testing,
            Some("local") | None => Self::Local,
            Some(other) => Self::Custom(other.to_string()),
        }
    }

    /// Get the .env file suffix for this environment
    pub fn env_file_suffix(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Check the suffix is a plain file name component (`[A-Za-z0-9_-]+`)
    pub fn has_safe_file_suffix(&self) -> bool {
        let suffix = self.env_file_suffix();
        !suffix.is_empty()
            && suffix
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment (local or development)
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Local | Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.env_file_suffix())
    }
}

/// An owned, resolved set of environment variables
///
/// Configuration is read from a snapshot rather than from `std::env`, so
/// loading `.env` files never touches process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from key/value pairs
    ///
    /// # Example
    /// ```
    /// use datasource::config::EnvSnapshot;
    ///
    /// let vars = EnvSnapshot::from_pairs([("DB_USER", "app")]);
    /// assert_eq!(vars.raw("DB_USER"), Some("app"));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Capture the real process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Stack file layers under the real environment
    ///
    /// Later file layers override earlier ones; `real` overrides every file.
    pub fn layered<I>(file_layers: I, real: EnvSnapshot) -> Self
    where
        I: IntoIterator<Item = EnvSnapshot>,
    {
        let mut vars = BTreeMap::new();
        for layer in file_layers.into_iter().chain(std::iter::once(real)) {
            vars.extend(layer.vars);
        }
        Self { vars }
    }

    /// Get the raw string value of a variable
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Get a variable parsed as `T`, or `default` when absent or invalid
    ///
    /// # Example
    /// ```
    /// use datasource::config::EnvSnapshot;
    ///
    /// let vars = EnvSnapshot::from_pairs([("DB_PORT", "not-a-port")]);
    /// let port: u16 = vars.get("DB_PORT", 52674);
    /// assert_eq!(port, 52674);
    /// ```
    pub fn get<T: FromStr>(&self, key: &str, default: T) -> T {
        self.optional(key).unwrap_or(default)
    }

    /// Get an optional variable parsed as `T`
    pub fn optional<T: FromStr>(&self, key: &str) -> Option<T> {
        self.raw(key).and_then(|v| v.parse().ok())
    }

    /// Get a required variable parsed as `T`
    pub fn required<T: FromStr>(&self, key: &str) -> Result<T, FrameworkError> {
        self.optional(key)
            .ok_or_else(|| FrameworkError::missing_variable(key))
    }

    /// Get a boolean flag, accepting `true`/`1`/`yes`/`on` and their negatives
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.raw(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        }
    }
}

/// Parse one `.env` file into a snapshot
///
/// Returns `None` when the file does not exist. Unreadable or malformed
/// files are skipped with a warning.
pub fn read_env_file(path: &Path) -> Option<EnvSnapshot> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable environment file");
            return None;
        }
    };

    let mut vars = BTreeMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping malformed environment file");
                return None;
            }
        }
    }

    debug!(path = %path.display(), count = vars.len(), "Loaded environment file");
    Some(EnvSnapshot { vars })
}

/// Load environment variables from .env files with proper precedence
///
/// Precedence (later overrides earlier):
/// 1. .env (base defaults)
/// 2. .env.local (local overrides, not committed)
/// 3. .env.{environment} (environment-specific)
/// 4. .env.{environment}.local (environment-specific local overrides)
/// 5. Actual system environment variables (highest priority)
///
/// The process environment is read, never written.
pub fn load_env_snapshot(project_root: &Path) -> EnvSnapshot {
    load_env_snapshot_with(project_root, EnvSnapshot::from_process())
}

/// Same as [`load_env_snapshot`] with an explicit real environment
pub fn load_env_snapshot_with(project_root: &Path, real: EnvSnapshot) -> EnvSnapshot {
    let base: Vec<EnvSnapshot> = [".env", ".env.local"]
        .iter()
        .filter_map(|name| read_env_file(&project_root.join(name)))
        .collect();

    // APP_ENV may itself come from the base files
    let env = Environment::detect_from(&EnvSnapshot::layered(base.clone(), real.clone()));
    if !env.has_safe_file_suffix() {
        warn!(environment = %env, "Ignoring environment-specific files for unsafe APP_ENV");
        return EnvSnapshot::layered(base, real);
    }
    let suffix = env.env_file_suffix();

    let specific = [format!(".env.{}", suffix), format!(".env.{}.local", suffix)]
        .into_iter()
        .filter_map(|name| read_env_file(&project_root.join(name)));

    EnvSnapshot::layered(base.into_iter().chain(specific), real)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_real_environment_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".env", "DB_USER=file_user\nDB_NAME=file_db\n");

        let real = EnvSnapshot::from_pairs([("DB_USER", "env_user")]);
        let vars = load_env_snapshot_with(dir.path(), real);

        assert_eq!(vars.raw("DB_USER"), Some("env_user"));
        assert_eq!(vars.raw("DB_NAME"), Some("file_db"));
    }

    #[test]
    fn test_file_precedence_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".env", "A=base\nB=base\nC=base\nD=base\n");
        write(dir.path(), ".env.local", "B=local\nC=local\nD=local\n");
        write(dir.path(), ".env.testing", "C=testing\nD=testing\n");
        write(dir.path(), ".env.testing.local", "D=testing_local\n");

        let real = EnvSnapshot::from_pairs([("APP_ENV", "testing")]);
        let vars = load_env_snapshot_with(dir.path(), real);

        assert_eq!(vars.raw("A"), Some("base"));
        assert_eq!(vars.raw("B"), Some("local"));
        assert_eq!(vars.raw("C"), Some("testing"));
        assert_eq!(vars.raw("D"), Some("testing_local"));
    }

    #[test]
    fn test_app_env_from_base_file_selects_specific_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".env", "APP_ENV=staging\nDB_NAME=base\n");
        write(dir.path(), ".env.staging", "DB_NAME=staging\n");

        let vars = load_env_snapshot_with(dir.path(), EnvSnapshot::new());

        assert_eq!(vars.raw("DB_NAME"), Some("staging"));
        assert_eq!(Environment::detect_from(&vars), Environment::Staging);
    }

    #[test]
    fn test_app_env_path_traversal_is_ignored() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("project");
        fs::create_dir_all(root.join(".env.")).unwrap();
        write(outer.path(), "secret", "LEAK=yes\n");
        write(&root, ".env", "DB_NAME=base\n");

        let real = EnvSnapshot::from_pairs([("APP_ENV", "/../../secret")]);
        let vars = load_env_snapshot_with(&root, real);

        assert_eq!(vars.raw("LEAK"), None);
        assert_eq!(vars.raw("DB_NAME"), Some("base"));
    }

    #[test]
    fn test_safe_file_suffix() {
        assert!(Environment::Custom("qa-eu_1".into()).has_safe_file_suffix());
        assert!(Environment::Production.has_safe_file_suffix());
        assert!(!Environment::Custom("../prod".into()).has_safe_file_suffix());
        assert!(!Environment::Custom("a/b".into()).has_safe_file_suffix());
        assert!(!Environment::Custom(String::new()).has_safe_file_suffix());
    }

    #[test]
    fn test_missing_files_yield_real_environment() {
        let dir = tempfile::tempdir().unwrap();
        let real = EnvSnapshot::from_pairs([("DB_USER", "only")]);

        let vars = load_env_snapshot_with(dir.path(), real.clone());

        assert_eq!(vars, real);
    }

    #[test]
    fn test_loading_does_not_touch_process_env() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            ".env",
            "DATASOURCE_ENV_TEST_SENTINEL=from_file\n",
        );

        let vars = load_env_snapshot(dir.path());

        assert_eq!(vars.raw("DATASOURCE_ENV_TEST_SENTINEL"), Some("from_file"));
        assert!(std::env::var("DATASOURCE_ENV_TEST_SENTINEL").is_err());
    }

    #[test]
    fn test_typed_getters() {
        let vars = EnvSnapshot::from_pairs([
            ("PORT", "6543"),
            ("BAD_PORT", "sixty"),
            ("FLAG", "Yes"),
            ("OFF", "0"),
        ]);

        assert_eq!(vars.get::<u16>("PORT", 1), 6543);
        assert_eq!(vars.get::<u16>("BAD_PORT", 1), 1);
        assert_eq!(vars.optional::<u16>("MISSING"), None);
        assert_eq!(vars.get_bool("FLAG"), Some(true));
        assert_eq!(vars.get_bool("OFF"), Some(false));
        assert_eq!(vars.get_bool("PORT"), None);
        assert_eq!(
            vars.required::<String>("MISSING"),
            Err(FrameworkError::missing_variable("MISSING"))
        );
    }

    #[test]
    fn test_environment_detection() {
        let detect = |v: &str| Environment::detect_from(&EnvSnapshot::from_pairs([("APP_ENV", v)]));

        assert_eq!(detect("production"), Environment::Production);
        assert_eq!(detect("local"), Environment::Local);
        assert_eq!(detect("qa"), Environment::Custom("qa".to_string()));
        assert_eq!(Environment::detect_from(&EnvSnapshot::new()), Environment::Local);
        assert!(Environment::Development.is_development());
        assert_eq!(Environment::Custom("qa".into()).to_string(), "qa");
    }
}
