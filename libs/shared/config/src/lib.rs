use std::env;

use chrono::NaiveTime;
use tracing::warn;

/// Default working hours and server settings, loaded from the environment.
///
/// Working hours are only defaults: every slot query may override them per
/// request, and nothing below this struct hardcodes clinic hours.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_port: u16,
    pub default_day_start: NaiveTime,
    pub default_day_end: NaiveTime,
    pub default_slot_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| {
                warn!("PORT not set, defaulting to 3000");
                3000
            });

        let default_day_start = parse_time_var("SCHEDULING_DAY_START", "09:00");
        let default_day_end = parse_time_var("SCHEDULING_DAY_END", "17:00");

        let default_slot_minutes = env::var("SCHEDULING_SLOT_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|m: &i32| *m > 0)
            .unwrap_or_else(|| {
                warn!("SCHEDULING_SLOT_MINUTES not set or invalid, defaulting to 30");
                30
            });

        let config = Self {
            bind_port,
            default_day_start,
            default_day_end,
            default_slot_minutes,
        };

        if config.default_day_start >= config.default_day_end {
            warn!(
                "Default working hours are empty ({} >= {})",
                config.default_day_start, config.default_day_end
            );
        }

        config
    }
}

fn parse_time_var(var: &str, fallback: &str) -> NaiveTime {
    let raw = env::var(var).unwrap_or_else(|_| {
        warn!("{} not set, defaulting to {}", var, fallback);
        fallback.to_string()
    });

    NaiveTime::parse_from_str(&raw, "%H:%M").unwrap_or_else(|_| {
        warn!("{} has invalid value {:?}, defaulting to {}", var, raw, fallback);
        NaiveTime::parse_from_str(fallback, "%H:%M").unwrap()
    })
}
