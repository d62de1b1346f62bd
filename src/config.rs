//! Runtime configuration read from the environment (and `.env`, if present).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::api::handler::HandlerOptions;
use crate::error::ConfigError;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub strict_validation: bool,
    pub recompute_total_on_update: bool,
}

impl Config {
    /// Load `.env` (missing file is fine) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidAddr {
                    var: "BIND_ADDR",
                    value,
                })?,
            None => DEFAULT_BIND_ADDR,
        };
        Ok(Self {
            bind_addr,
            strict_validation: parse_bool("STRICT_VALIDATION", lookup("STRICT_VALIDATION"))?,
            recompute_total_on_update: parse_bool(
                "RECOMPUTE_TOTAL_ON_UPDATE",
                lookup("RECOMPUTE_TOTAL_ON_UPDATE"),
            )?,
        })
    }

    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            strict_validation: self.strict_validation,
            recompute_total_on_update: self.recompute_total_on_update,
        }
    }
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}
