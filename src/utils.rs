use chrono::{DateTime, FixedOffset, Utc};
use ezlogger::Arg;

/// Parses an RFC 3339 instant, keeping its offset. Also accepts the looser
/// `YYYY-MM-DD HH:MM:SS` form, read as UTC.
pub fn parse_instant(value: &str) -> eyre::Result<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant);
    }

    let time = humantime::parse_rfc3339_weak(value)?;
    Ok(DateTime::<Utc>::from(time).fixed_offset())
}

/// Integers and floats are passed as numbers so `%d` and `%f` accept them.
pub fn parse_arg(value: &str) -> Arg {
    if let Ok(v) = value.parse::<i64>() {
        return Arg::Int(v);
    }
    if let Ok(v) = value.parse::<f64>() {
        return Arg::Float(v);
    }
    Arg::Str(value.to_string())
}
