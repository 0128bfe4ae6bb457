//! Date patterns accepted by `${datefmt(PATTERN)}`.
//!
//! A pattern is made of letter runs (`yyyy`, `MM`, `HH`, ...) whose length picks
//! the width or textual form of a field. Text between single quotes is copied
//! verbatim and `''` yields one quote. Any other non-letter is copied as is.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use super::error::FormatError;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Formats `instant` according to `pattern`.
pub fn format_instant(
    pattern: &str,
    instant: &DateTime<FixedOffset>,
) -> Result<String, FormatError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                out.push('\'');
                continue;
            }

            // An unterminated quote runs to the end of the pattern.
            while let Some(quoted) = chars.next() {
                if quoted != '\'' {
                    out.push(quoted);
                } else if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    break;
                }
            }
            continue;
        }

        if !c.is_ascii_alphabetic() {
            out.push(c);
            continue;
        }

        let mut count = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            count += 1;
        }

        if !push_field(&mut out, c, count, instant) {
            return Err(FormatError::InvalidDatePattern {
                pattern: pattern.to_string(),
                letter: c,
            });
        }
    }

    Ok(out)
}

fn push_field(out: &mut String, letter: char, count: usize, t: &DateTime<FixedOffset>) -> bool {
    match letter {
        'G' => out.push_str(if t.year() > 0 { "AD" } else { "BC" }),
        'y' if count == 2 => pad(out, i64::from(t.year().rem_euclid(100)), 2),
        'y' => pad(out, i64::from(t.year()), count),
        'Y' if count == 2 => pad(out, i64::from(t.iso_week().year().rem_euclid(100)), 2),
        'Y' => pad(out, i64::from(t.iso_week().year()), count),
        'M' | 'L' => match count {
            1 | 2 => pad(out, i64::from(t.month()), count),
            3 => out.push_str(&MONTHS[t.month0() as usize][..3]),
            _ => out.push_str(MONTHS[t.month0() as usize]),
        },
        'd' => pad(out, i64::from(t.day()), count),
        'D' => pad(out, i64::from(t.ordinal()), count),
        'w' => pad(out, i64::from(t.iso_week().week()), count),
        'W' => {
            // Weeks start on Monday; the week holding the 1st is week 1.
            let first = (t.weekday().num_days_from_monday() + 35 - t.day0() % 7) % 7;
            pad(out, i64::from((t.day0() + first) / 7 + 1), count)
        }
        'F' => pad(out, i64::from(t.day0() / 7 + 1), count),
        'E' => {
            let name = WEEKDAYS[t.weekday().num_days_from_monday() as usize];
            if count <= 3 {
                out.push_str(&name[..3]);
            } else {
                out.push_str(name);
            }
        }
        'u' => pad(out, i64::from(t.weekday().number_from_monday()), count),
        'a' => out.push_str(if t.hour() < 12 { "AM" } else { "PM" }),
        'H' => pad(out, i64::from(t.hour()), count),
        'k' => pad(out, i64::from(if t.hour() == 0 { 24 } else { t.hour() }), count),
        'K' => pad(out, i64::from(t.hour() % 12), count),
        'h' => pad(out, i64::from(t.hour12().1), count),
        'm' => pad(out, i64::from(t.minute()), count),
        's' => pad(out, i64::from(t.second()), count),
        'S' => pad(out, i64::from(t.timestamp_subsec_millis()), count),
        'z' => {
            let seconds = t.offset().local_minus_utc();
            if seconds == 0 {
                out.push_str("UTC");
            } else {
                out.push_str("GMT");
                push_offset(out, seconds, false, true);
            }
        }
        'Z' => push_offset(out, t.offset().local_minus_utc(), false, false),
        'X' => {
            let seconds = t.offset().local_minus_utc();
            if seconds == 0 {
                out.push('Z');
            } else {
                push_offset(out, seconds, count == 1, count >= 3);
            }
        }
        _ => return false,
    }

    true
}

fn pad(out: &mut String, value: i64, width: usize) {
    out.push_str(&format!("{value:0width$}"));
}

fn push_offset(out: &mut String, seconds: i32, hours_only: bool, colon: bool) {
    out.push(if seconds < 0 { '-' } else { '+' });

    let minutes = seconds.abs() / 60;
    pad(out, i64::from(minutes / 60), 2);

    if hours_only {
        return;
    }
    if colon {
        out.push(':');
    }
    pad(out, i64::from(minutes % 60), 2);
}
