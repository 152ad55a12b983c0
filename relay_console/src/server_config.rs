use anyhow::Context;
use relay_chess::network;
use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseOptions {
    // Session state lives only as long as the server process.
    InMemory,
    Sqlite(String),
    Postgres(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_route")]
    pub route: String,
    pub database_options: DatabaseOptions,
}

fn default_listen_address() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { network::PORT }
fn default_route() -> String { network::DEFAULT_ROUTE.to_owned() }

pub fn read_config_file(filename: &str) -> anyhow::Result<ServerConfig> {
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to read config file '{filename}'."))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file '{filename}'."))
}
