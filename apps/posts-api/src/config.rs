//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use posts_core::ports::InstanceInfo;
use posts_infra::database::MongoConfig;

/// Configuration errors - all fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Not found variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Failed to load env file {file}: {reason}")]
    EnvFile { file: String, reason: String },
}

/// Load `.env`, or `.env.<ENVIRONMENT>` when `ENVIRONMENT` is set, into the process
/// environment. Variables already present in the environment win.
///
/// A missing `.env` is tolerated; a missing file for an explicitly named
/// environment is not.
pub fn load_env_file() -> Result<Option<PathBuf>, ConfigError> {
    let environment = env::var("ENVIRONMENT").ok().filter(|e| !e.is_empty());
    let file = env_file_name(environment.as_deref());

    match dotenvy::from_filename(&file) {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() && environment.is_none() => Ok(None),
        Err(e) => Err(ConfigError::EnvFile {
            file,
            reason: e.to_string(),
        }),
    }
}

fn env_file_name(environment: Option<&str>) -> String {
    match environment {
        Some(env) => format!(".env.{env}"),
        None => ".env".to_string(),
    }
}

/// Active deployment profile, e.g. `dev` or `prod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Any profile naming `prod` selects the production auth strategy.
    pub fn is_production(&self) -> bool {
        self.0.contains("prod")
    }
}

/// Discovery registry settings and this instance's identity.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub server_url: String,
    pub app_id: String,
    pub host_name: String,
    pub ip_address: String,
    pub renewal_interval: Duration,
}

/// Config server settings.
#[derive(Debug, Clone)]
pub struct RemoteConfigSettings {
    pub uri: String,
    pub encrypt_key: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub server_port: u16,
    pub mongo: MongoConfig,
    pub registry: RegistryConfig,
    pub remote_config: RemoteConfigSettings,
    pub profile: Profile,
    /// Required when the profile is production.
    pub public_key_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let app_id = vars.required("APP_ID")?;
        let mongo = MongoConfig {
            uri: vars.required("MONGODB_URI")?,
            database: vars.required("MONGODB_DATABASE")?,
            app_name: Some(app_id.clone()),
        };
        let server_port = vars.parse_required("SERVER_PORT")?;

        let registry = RegistryConfig {
            server_url: vars.required("EUREKA_SERVER")?,
            host_name: vars.required("HOSTNAME")?,
            ip_address: vars.required("IP_ADDRESS")?,
            renewal_interval: renewal_interval(&vars)?,
            app_id,
        };

        let remote_config = RemoteConfigSettings {
            uri: vars.required("SPRING_CLOUD_CONFIG_URI")?,
            encrypt_key: vars.required("X_ENCRYPT_KEY")?,
        };

        let profile = Profile::new(vars.required("SPRING_PROFILES_ACTIVE")?);
        let public_key_path = if profile.is_production() {
            Some(PathBuf::from(vars.required("PUBLIC_KEY_PATH")?))
        } else {
            vars.optional("PUBLIC_KEY_PATH").map(PathBuf::from)
        };

        Ok(Self {
            bind_address: vars
                .optional("BIND_ADDRESS")
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            mongo,
            registry,
            remote_config,
            profile,
            public_key_path,
        })
    }
}

impl RegistryConfig {
    /// This process as the registry should see it.
    pub fn instance_info(&self, port: u16) -> InstanceInfo {
        InstanceInfo::new(&self.app_id, &self.host_name, &self.ip_address, port)
    }
}

fn renewal_interval<F>(vars: &Vars<F>) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    const VAR: &str = "EUREKA_RENEWAL_INTERVAL_SECS";

    match vars.parse_optional::<u64>(VAR)? {
        None => Ok(Duration::from_secs(30)),
        Some(0) => Err(ConfigError::Invalid {
            var: VAR,
            reason: "must be at least 1 second".to_string(),
        }),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as absent.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        let value = self.optional(key).ok_or(ConfigError::Missing(key))?;
        tracing::debug!(var = key, "Loaded configuration variable");
        Ok(value)
    }

    fn parse_required<T>(&self, key: &'static str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        parse(key, &self.required(key)?)
    }

    fn parse_optional<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map(|v| parse(key, &v)).transpose()
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
