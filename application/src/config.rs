//! Application settings.

use std::{str::FromStr as _, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Settings of the whole application, grouped by concern.
///
/// Every omitted setting falls back to its default value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: Server,

    /// Business logic settings.
    pub service: Service,

    /// Database connection settings.
    pub postgres: Postgres,

    /// Logging settings.
    pub log: Log,
}

impl Config {
    /// Reads the [`Config`] from the TOML file at the provided `path`, when it
    /// exists, overriding its values with `CONF.`-prefixed environment
    /// variables (e.g. `CONF.SERVER.PORT=9000`).
    ///
    /// # Errors
    ///
    /// If any of the sources contains a malformed value.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let file = config::File::with_name(path.as_ref()).required(false);
        let env = config::Environment::with_prefix("CONF").separator(".");

        ConfigBuilder::<DefaultState>::default()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Address to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// Cross-origin requests policy.
    pub cors: Cors,
}

/// Cross-origin requests policy.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins allowed to call the API, `*` allows any.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Business logic settings.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Paging of `User` lists.
    pub users: Users,
}

/// Paging of `User` lists.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Users {
    /// Page size used when a client doesn't request one.
    #[default(10)]
    pub default_limit: usize,

    /// Largest page size a client may request.
    #[default(100)]
    pub max_limit: usize,
}

impl From<Service> for service::Config {
    fn from(s: Service) -> Self {
        Self {
            users: service::query::users::Config {
                default_limit: s.users.default_limit,
                max_limit: s.users.max_limit,
            },
        }
    }
}

/// Database connection settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Hostname of the database server.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port of the database server.
    #[default(5432)]
    pub port: u16,

    /// Role to authenticate as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password of the [`Postgres::user`].
    #[default("postgres".to_owned())]
    pub password: String,

    /// Name of the database holding `User`s.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Time to wait for a new connection to be established.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: time::Duration,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(pg: Postgres) -> Self {
        let mut conf = Self::new();
        conf.host = Some(pg.host);
        conf.port = Some(pg.port);
        conf.user = Some(pg.user);
        conf.password = Some(pg.password);
        conf.dbname = Some(pg.dbname);
        conf.connect_timeout = Some(pg.connect_timeout);
        conf
    }
}

/// Logging settings.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Least severe level of the emitted events.
    pub level: Level,
}

/// Severity level of log events, parsed case-insensitively from `TRACE`,
/// `DEBUG`, `INFO`, `WARN` or `ERROR`.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(try_from = "String")]
pub struct Level(#[default(tracing::Level::INFO)] tracing::Level);

impl TryFrom<String> for Level {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        tracing::Level::from_str(s.trim())
            .map(Self)
            .map_err(|e| format!("invalid log level `{s}`: {e}"))
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        level.0
    }
}
