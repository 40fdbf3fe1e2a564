//! Configuration file (`config.toml`).
//!
//! ```toml
//! SchemaName1 = "shop"
//! SchemaName2 = "shop"
//!
//! [Servers.1]
//! Host = "prod-db.internal"
//! Port = "3306"
//! User = "readonly"
//! Password = "..."
//! Name = "shop"
//!
//! [Servers.2]
//! Host = "staging-db.internal"
//! Port = 3306
//! User = "readonly"
//! Password = "..."
//! Name = "shop"
//! ```

use serde::{Deserialize, Deserializer};
use sqlx::mysql::MySqlConnectOptions;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::util::{Result, SchemaError};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Which of the two compared servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn key(self) -> &'static str {
        match self {
            Side::Left => "1",
            Side::Right => "2",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "port_from_string_or_int")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_port() -> u16 {
    3306
}

fn port_from_string_or_int<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl ServerConfig {
    /// Connection options for this server, using the utf8 charset.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .charset("utf8");
        let options = if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        };
        match &self.name {
            Some(name) => options.database(name),
            None => options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(rename = "SchemaName1")]
    pub left_schema: Option<String>,
    #[serde(rename = "SchemaName2")]
    pub right_schema: Option<String>,
    #[serde(rename = "Servers", default)]
    pub servers: BTreeMap<String, ServerConfig>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchemaError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| SchemaError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn server(&self, side: Side) -> Result<&ServerConfig> {
        self.servers.get(side.key()).ok_or_else(|| {
            SchemaError::Config(format!(
                "No [Servers.{}] section for the {side} database",
                side.key()
            ))
        })
    }

    pub fn schema(&self, side: Side) -> Option<&str> {
        match side {
            Side::Left => self.left_schema.as_deref(),
            Side::Right => self.right_schema.as_deref(),
        }
    }
}
