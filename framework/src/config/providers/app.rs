use crate::config::env::{EnvSnapshot, Environment};
use crate::database::BuildMode;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Application name
    pub name: String,
    /// Current environment
    pub environment: Environment,
    /// Whether schema globs point at sources or compiled output
    pub build_mode: BuildMode,
}

impl AppConfig {
    /// Build config from a resolved environment snapshot
    pub fn from_env(vars: &EnvSnapshot) -> Self {
        Self {
            name: vars.get("APP_NAME", "datasource".to_string()),
            environment: Environment::detect_from(vars),
            build_mode: BuildMode::current(),
        }
    }

    /// Create a builder for customizing config
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

/// Builder for AppConfig
#[derive(Default)]
pub struct AppConfigBuilder {
    name: Option<String>,
    environment: Option<Environment>,
    build_mode: Option<BuildMode>,
}

impl AppConfigBuilder {
    /// Set the application name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the environment
    pub fn environment(mut self, env: Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the build mode
    pub fn build_mode(mut self, mode: BuildMode) -> Self {
        self.build_mode = Some(mode);
        self
    }

    /// Build the AppConfig, filling unset fields from `vars`
    pub fn build(self, vars: &EnvSnapshot) -> AppConfig {
        let default = AppConfig::from_env(vars);
        AppConfig {
            name: self.name.unwrap_or(default.name),
            environment: self.environment.unwrap_or(default.environment),
            build_mode: self.build_mode.unwrap_or(default.build_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        let vars = EnvSnapshot::from_pairs([("APP_NAME", "billing"), ("APP_ENV", "production")]);
        let config = AppConfig::from_env(&vars);

        assert_eq!(config.name, "billing");
        assert!(config.is_production());
        assert_eq!(config.build_mode, BuildMode::current());
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::builder()
            .name("cli")
            .build_mode(BuildMode::Distribution)
            .build(&EnvSnapshot::new());

        assert_eq!(config.name, "cli");
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.build_mode, BuildMode::Distribution);
    }
}
