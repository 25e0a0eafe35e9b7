//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod aliases;
pub mod document;
pub mod get;
pub mod profiles;
pub mod replicates;
pub mod search;
pub mod send;
pub mod upload;

use crate::config::Config;
use crate::connection::Connection;
use crate::error::Result;
use dcc_common::DccMode;
use serde::Serialize;

/// Load the configuration and open a Portal connection
pub async fn connect(mode: Option<DccMode>) -> Result<Connection> {
    let mut config = Config::from_env()?;
    if let Some(mode) = mode {
        if mode != config.mode {
            config = config.with_mode(mode);
        }
    }
    Connection::connect(config).await
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
