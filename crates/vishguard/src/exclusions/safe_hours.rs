//! Safe-calling-hours evaluation.
//!
//! Advisory scheduling only: the evaluator decides whether a wall-clock
//! instant falls inside the organization's permitted calling window for a
//! given timezone. It performs no I/O and must be re-evaluated fresh for each
//! decision because `now` moves continuously.

use chrono::{DateTime, Datelike, Local, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Organization-wide safe-hours policy, minute granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeHoursConfig {
    pub enabled: bool,
    /// IANA zone identifier, e.g. `America/New_York`.
    pub default_timezone: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub exclude_weekends: bool,
}

impl Default for SafeHoursConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_timezone: "America/New_York".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"),
            exclude_weekends: true,
        }
    }
}

impl SafeHoursConfig {
    /// Human-readable window, e.g. `9:00 AM - 5:00 PM`.
    pub fn window_label(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%-I:%M %p"),
            self.end_time.format("%-I:%M %p")
        )
    }
}

/// Why a call is not permitted right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeHoursRefusal {
    Weekend,
    BeforeWindow { starts_at: NaiveTime },
    AfterWindow { ended_at: NaiveTime },
}

impl std::fmt::Display for SafeHoursRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafeHoursRefusal::Weekend => write!(f, "Weekend - calls not permitted"),
            SafeHoursRefusal::BeforeWindow { starts_at } => {
                write!(f, "Before safe hours (starts at {})", starts_at.format("%H:%M"))
            }
            SafeHoursRefusal::AfterWindow { ended_at } => {
                write!(f, "After safe hours (ended at {})", ended_at.format("%H:%M"))
            }
        }
    }
}

/// Result of one safe-hours evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHoursDecision {
    pub allowed: bool,
    pub refusal: Option<SafeHoursRefusal>,
    /// Wall-clock rendering in the effective zone, for operator display.
    pub local_time: String,
}

impl SafeHoursDecision {
    fn allowed(local_time: String) -> Self {
        Self {
            allowed: true,
            refusal: None,
            local_time,
        }
    }

    fn refused(refusal: SafeHoursRefusal, local_time: String) -> Self {
        Self {
            allowed: false,
            refusal: Some(refusal),
            local_time,
        }
    }
}

/// Evaluate the calling window for `now`.
///
/// The effective zone is the employee override when present, otherwise the
/// config default. An identifier that fails IANA resolution falls back to the
/// host's local offset; this is advisory scheduling, so a misconfigured zone
/// must never turn into a hard error. The window is inclusive of its start
/// and exclusive of its end.
pub fn evaluate(
    config: &SafeHoursConfig,
    now: DateTime<Utc>,
    employee_timezone: Option<&str>,
) -> SafeHoursDecision {
    let timezone = employee_timezone.unwrap_or(&config.default_timezone);
    let (weekday, minute_of_day, local_time) = local_clock(now, timezone);

    if !config.enabled {
        return SafeHoursDecision::allowed(local_time);
    }

    if config.exclude_weekends && matches!(weekday, Weekday::Sat | Weekday::Sun) {
        return SafeHoursDecision::refused(SafeHoursRefusal::Weekend, local_time);
    }

    let start = minutes_since_midnight(config.start_time);
    let end = minutes_since_midnight(config.end_time);

    if minute_of_day < start {
        return SafeHoursDecision::refused(
            SafeHoursRefusal::BeforeWindow {
                starts_at: config.start_time,
            },
            local_time,
        );
    }

    if minute_of_day >= end {
        return SafeHoursDecision::refused(
            SafeHoursRefusal::AfterWindow {
                ended_at: config.end_time,
            },
            local_time,
        );
    }

    SafeHoursDecision::allowed(local_time)
}

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn local_clock(now: DateTime<Utc>, timezone: &str) -> (Weekday, u32, String) {
    match timezone.parse::<Tz>() {
        Ok(zone) => {
            let local = now.with_timezone(&zone);
            (
                local.weekday(),
                local.hour() * 60 + local.minute(),
                local.format("%-I:%M %p").to_string(),
            )
        }
        Err(_) => {
            let local = now.with_timezone(&Local);
            (
                local.weekday(),
                local.hour() * 60 + local.minute(),
                local.format("%-I:%M %p").to_string(),
            )
        }
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(serde::de::Error::custom)
    }
}
