//! Table configuration.
//!
//! The only knobs are who sits at the table and how long a time unit is.
//! The binary reads two optional environment variables on top of the defaults:
//!
//! - `DINING_SEATS` - number of seats; names become `A0..A{n-1}`
//! - `DINING_TIME_UNIT_MS` - length of one time unit in milliseconds
//!
//! Log verbosity is controlled separately through `RUST_LOG`
//! (see [`setup_tracing`](crate::lifecycle::setup_tracing)).

use crate::framework::error::TableError;
use crate::model::Pacing;
use crate::philosopher::Timing;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SEATS_ENV: &str = "DINING_SEATS";
pub const TIME_UNIT_ENV: &str = "DINING_TIME_UNIT_MS";

const DEFAULT_NAMES: [&str; 5] = ["Socrates", "Plato", "Pythagoras", "Aristotle", "Diogenes"];

/// Everything [`DiningTable::start`](crate::lifecycle::DiningTable::start) needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// One name per seat; the seat count is `names.len()`.
    pub names: Vec<String>,
    pub time_unit: Duration,
    pub think: Pacing,
    pub eat: Pacing,
    /// Monitor period, in time units.
    pub report_every: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            names: DEFAULT_NAMES.iter().map(|name| name.to_string()).collect(),
            time_unit: Duration::from_secs(1),
            think: Pacing::default(),
            eat: Pacing::default(),
            report_every: 1,
        }
    }
}

impl TableConfig {
    /// A table of `seats` philosophers named `A0..A{seats-1}`.
    pub fn with_seats(seats: usize) -> Self {
        Self {
            names: (0..seats).map(|i| format!("A{i}")).collect(),
            ..Self::default()
        }
    }

    pub fn names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn think(mut self, pacing: Pacing) -> Self {
        self.think = pacing;
        self
    }

    pub fn eat(mut self, pacing: Pacing) -> Self {
        self.eat = pacing;
        self
    }

    pub fn report_every(mut self, units: u32) -> Self {
        self.report_every = units;
        self
    }

    pub fn seats(&self) -> usize {
        self.names.len()
    }

    pub fn timing(&self) -> Timing {
        Timing {
            unit: self.time_unit,
            think: self.think,
            eat: self.eat,
        }
    }

    pub fn report_period(&self) -> Duration {
        self.time_unit * self.report_every
    }

    /// Longest single think or eat sleep.
    pub fn max_sleep(&self) -> Duration {
        self.time_unit * self.think.max_units().max(self.eat.max_units())
    }

    /// Defaults overridden by `DINING_SEATS` and `DINING_TIME_UNIT_MS`.
    pub fn from_env() -> Result<Self, TableError> {
        let mut config = match std::env::var(SEATS_ENV) {
            Ok(raw) => Self::with_seats(parse_env(SEATS_ENV, &raw)?),
            Err(_) => Self::default(),
        };
        if let Ok(raw) = std::env::var(TIME_UNIT_ENV) {
            config.time_unit = Duration::from_millis(parse_env(TIME_UNIT_ENV, &raw)?);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        // Two seats is the smallest ring in which each fork has two distinct users.
        if self.seats() < 2 {
            return Err(TableError::InvalidConfig(format!(
                "need at least 2 seats, got {}",
                self.seats()
            )));
        }
        if self.names.iter().any(|name| name.trim().is_empty()) {
            return Err(TableError::InvalidConfig("empty philosopher name".into()));
        }
        if self.time_unit.is_zero() {
            return Err(TableError::InvalidConfig("time unit must be non-zero".into()));
        }
        if self.report_every == 0 {
            return Err(TableError::InvalidConfig("report period must be non-zero".into()));
        }
        self.think.validate().map_err(TableError::InvalidConfig)?;
        self.eat.validate().map_err(TableError::InvalidConfig)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, TableError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| TableError::InvalidConfig(format!("{key}={raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let config = TableConfig::default();
        assert_eq!(config.seats(), 5);
        assert_eq!(config.names[0], "Socrates");
        assert_eq!(config.think, Pacing::Random { min: 1, max: 8 });
        assert_eq!(config.max_sleep(), Duration::from_secs(8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_seats_generates_names() {
        let config = TableConfig::with_seats(3).time_unit(Duration::from_millis(5));
        assert_eq!(config.names, vec!["A0", "A1", "A2"]);
        assert_eq!(config.report_period(), Duration::from_millis(5));
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        assert!(matches!(
            TableConfig::with_seats(1).validate(),
            Err(TableError::InvalidConfig(_))
        ));
        assert!(TableConfig::default()
            .time_unit(Duration::ZERO)
            .validate()
            .is_err());
        assert!(TableConfig::default()
            .eat(Pacing::Random { min: 3, max: 1 })
            .validate()
            .is_err());
        assert!(TableConfig::default().names(["Plato", " "]).validate().is_err());
        assert!(TableConfig::default().report_every(0).validate().is_err());
    }

    #[test]
    fn test_parse_env_reports_key() {
        let err = parse_env::<usize>(SEATS_ENV, "five").unwrap_err();
        assert!(err.to_string().contains("DINING_SEATS=five"));
        assert_eq!(parse_env::<u64>(TIME_UNIT_ENV, " 250 ").unwrap(), 250);
    }
}
