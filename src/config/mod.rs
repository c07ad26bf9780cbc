//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast if a required variable is missing
//! or malformed. In local dev, call `dotenvy::dotenv().ok()` first.

use std::path::PathBuf;
use std::str::FromStr;

use crate::attendance::AttendanceRecords;
use crate::department::DepartmentMap;
use crate::error::{Error, Result};
use crate::store::DEFAULT_EVENT_LIMIT;

/// Commit attempts per operation when the snapshot version moves underneath.
pub const DEFAULT_ASSIGN_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON snapshot document backing the floor.
    pub store_path: PathBuf,
    /// Department map TOML. `None` uses the stock departments.
    pub departments_path: Option<PathBuf>,
    /// Attendance export (JSON). `None` means attendance figures are unknown.
    pub attendance_path: Option<PathBuf>,
    pub assign_retries: u32,
    /// Events the store keeps before dropping the oldest.
    pub event_limit: usize,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store_path: PathBuf::from(required_var("ATELIER_STORE")?),
            departments_path: optional_var("ATELIER_DEPARTMENTS").map(PathBuf::from),
            attendance_path: optional_var("ATELIER_ATTENDANCE").map(PathBuf::from),
            assign_retries: positive_var("ATELIER_ASSIGN_RETRIES")?
                .unwrap_or(DEFAULT_ASSIGN_RETRIES),
            event_limit: positive_var("ATELIER_EVENT_LIMIT")?.unwrap_or(DEFAULT_EVENT_LIMIT),
            otel_endpoint: optional_var("OTEL_ENDPOINT"),
            log_level: optional_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The configured department map, or the stock one.
    pub fn departments(&self) -> Result<DepartmentMap> {
        match &self.departments_path {
            Some(path) => DepartmentMap::load(path),
            None => Ok(DepartmentMap::standard()),
        }
    }

    /// The configured attendance export, if any.
    pub fn attendance(&self) -> Result<Option<AttendanceRecords>> {
        self.attendance_path
            .as_deref()
            .map(AttendanceRecords::load)
            .transpose()
    }
}

fn required_var(name: &str) -> Result<String> {
    optional_var(name)
        .ok_or_else(|| Error::Config(format!("required environment variable {name} is not set")))
}

/// Unset and empty both count as absent.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// A variable that, when set, must hold an integer of at least 1.
fn positive_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = optional_var(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(Some(n)),
        _ => Err(Error::Config(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}
