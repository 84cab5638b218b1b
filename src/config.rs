use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::domain::catalog::ProximityQuery;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Settings for talking to the remote API, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub proximity_radius_km: f64,
    pub orders_per_page: u32,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
    pub const DEFAULT_RADIUS_KM: f64 = 5.0;
    pub const DEFAULT_ORDERS_PER_PAGE: u32 = 10;

    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            proximity_radius_km: Self::DEFAULT_RADIUS_KM,
            orders_per_page: Self::DEFAULT_ORDERS_PER_PAGE,
        }
    }

    /// Reads `API_BASE_URL` (required), `API_TOKEN`, `REQUEST_TIMEOUT_SECS`,
    /// `PROXIMITY_RADIUS_KM` and `ORDERS_PER_PAGE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup("API_BASE_URL").ok_or(ConfigError::Missing("API_BASE_URL"))?;
        let mut config = Self::new(base);
        config.api_token = lookup("API_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(secs) = parse_var::<u64, _>(&lookup, "REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(radius) = parse_var::<f64, _>(&lookup, "PROXIMITY_RADIUS_KM")? {
            config.proximity_radius_km = radius;
        }
        if let Some(per_page) = parse_var::<u32, _>(&lookup, "ORDERS_PER_PAGE")? {
            if per_page == 0 {
                return Err(ConfigError::Invalid {
                    name: "ORDERS_PER_PAGE",
                    value: per_page.to_string(),
                });
            }
            config.orders_per_page = per_page;
        }
        Ok(config)
    }

    pub fn proximity(&self, latitude: f64, longitude: f64) -> ProximityQuery {
        ProximityQuery {
            latitude,
            longitude,
            radius_km: self.proximity_radius_km,
        }
    }
}

/// Device location for the `cart-session` binary, from `DEVICE_LAT` and
/// `DEVICE_LNG`.
pub fn device_location_from_env() -> Result<(f64, f64), ConfigError> {
    let lookup = |name: &str| env::var(name).ok();
    let lat = parse_var::<f64, _>(&lookup, "DEVICE_LAT")?.ok_or(ConfigError::Missing("DEVICE_LAT"))?;
    let lng = parse_var::<f64, _>(&lookup, "DEVICE_LNG")?.ok_or(ConfigError::Missing("DEVICE_LNG"))?;
    Ok((lat, lng))
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
