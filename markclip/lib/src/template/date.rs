//! `{date:FORMAT}` rendering with moment-style format tokens.
//!
//! Supported tokens: `YYYY YY`, `MMMM MMM MM M`, `DDDD DDD DD Do D`,
//! `dddd ddd dd d E`, `HH H hh h kk k`, `mm m`, `ss s`, `SSS SS S`, `A a`,
//! `ZZ Z`, `X x`, `ww w`, `Q`. Text inside `[...]` is copied verbatim and
//! any other character passes through.

use std::fmt::Display;

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike};

/// Longest tokens first so `MMMM` wins over `MM`.
const TOKENS: &[&str] = &[
    "YYYY", "YY", "MMMM", "MMM", "MM", "M", "DDDD", "DDD", "DD", "Do", "D", "dddd", "ddd", "dd",
    "d", "E", "HH", "H", "hh", "h", "kk", "k", "mm", "m", "ss", "s", "SSS", "SS", "S", "A", "a",
    "ZZ", "Z", "X", "x", "ww", "w", "Q",
];

/// Renders `at` using a moment-style `format` string.
///
/// ## Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use markclip_lib::template::format_date;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
/// assert_eq!(format_date("YYYY-MM-DD[T]HH:mm", &at), "2024-03-05T14:07");
/// ```
pub fn format_date<Tz>(format: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '['
            && let Some(end) = rest.find(']')
        {
            out.push_str(&rest[1..end]);
            rest = &rest[end + 1..];
            continue;
        }

        match TOKENS.iter().find(|token| rest.starts_with(**token)) {
            Some(token) => {
                out.push_str(&render_token(token, at));
                rest = &rest[token.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out
}

fn render_token<Tz>(token: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let (is_pm, hour12) = at.hour12();
    match token {
        "YYYY" => format!("{:04}", at.year()),
        "YY" => format!("{:02}", at.year().rem_euclid(100)),
        "MMMM" => at.format("%B").to_string(),
        "MMM" => at.format("%b").to_string(),
        "MM" => format!("{:02}", at.month()),
        "M" => at.month().to_string(),
        "DDDD" => format!("{:03}", at.ordinal()),
        "DDD" => at.ordinal().to_string(),
        "DD" => format!("{:02}", at.day()),
        "Do" => ordinal(at.day()),
        "D" => at.day().to_string(),
        "dddd" => at.format("%A").to_string(),
        "ddd" => at.format("%a").to_string(),
        "dd" => at.format("%a").to_string().chars().take(2).collect(),
        "d" => at.weekday().num_days_from_sunday().to_string(),
        "E" => at.weekday().number_from_monday().to_string(),
        "HH" => format!("{:02}", at.hour()),
        "H" => at.hour().to_string(),
        "hh" => format!("{hour12:02}"),
        "h" => hour12.to_string(),
        "kk" => format!("{:02}", kilo_hour(at.hour())),
        "k" => kilo_hour(at.hour()).to_string(),
        "mm" => format!("{:02}", at.minute()),
        "m" => at.minute().to_string(),
        "ss" => format!("{:02}", at.second()),
        "s" => at.second().to_string(),
        "SSS" => format!("{:03}", at.timestamp_subsec_millis()),
        "SS" => format!("{:02}", at.timestamp_subsec_millis() / 10),
        "S" => (at.timestamp_subsec_millis() / 100).to_string(),
        "A" => String::from(if is_pm { "PM" } else { "AM" }),
        "a" => String::from(if is_pm { "pm" } else { "am" }),
        "ZZ" => at.format("%z").to_string(),
        "Z" => at.format("%:z").to_string(),
        "X" => at.timestamp().to_string(),
        "x" => at.timestamp_millis().to_string(),
        "ww" => format!("{:02}", week_of_year(at)),
        "w" => week_of_year(at).to_string(),
        "Q" => (at.month0() / 3 + 1).to_string(),
        other => other.to_string(),
    }
}

/// `1st`, `2nd`, `3rd`, `4th` … `11th`, `12th`, `13th`, `21st`.
fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

/// Hour on the 1-24 clock.
fn kilo_hour(hour: u32) -> u32 {
    if hour == 0 { 24 } else { hour }
}

/// Sunday-based week number where the week holding January 1st is week 1.
fn week_of_year<Tz: TimeZone>(at: &DateTime<Tz>) -> u32 {
    let days_to_saturday = 6 - i64::from(at.weekday().num_days_from_sunday());
    let saturday = at.date_naive() + Duration::days(days_to_saturday);
    saturday.ordinal0() / 7 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn renders_numeric_tokens() {
        assert_eq!(format_date("YYYY-MM-DDTHH:mm:ss", &sample()), "2024-03-05T14:07:09");
        assert_eq!(format_date("YY/M/D H:m:s", &sample()), "24/3/5 14:7:9");
    }

    #[test]
    fn renders_names_and_ordinals() {
        assert_eq!(format_date("dddd, MMMM Do", &sample()), "Tuesday, March 5th");
        assert_eq!(format_date("ddd MMM dd", &sample()), "Tue Mar Tu");
    }

    #[test]
    fn twelve_hour_clock() {
        assert_eq!(format_date("h:mm A", &sample()), "2:07 PM");
        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(format_date("hh a k", &midnight), "12 am 24");
    }

    #[test]
    fn bracketed_text_is_literal() {
        assert_eq!(format_date("[Today is] dddd", &sample()), "Today is Tuesday");
        assert_eq!(format_date("[!!", &sample()), "[!!");
    }

    #[test]
    fn offsets_follow_the_time_zone() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(format_date("Z", &at), "+09:00");
        assert_eq!(format_date("ZZ", &at), "+0900");
        assert_eq!(format_date("Z", &sample()), "+00:00");
    }

    #[test]
    fn epoch_and_quarter() {
        assert_eq!(format_date("X", &sample()), sample().timestamp().to_string());
        assert_eq!(format_date("Q", &sample()), "1");
        let dec = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(format_date("Q", &dec), "4");
    }

    #[test]
    fn week_holding_january_first_is_week_one() {
        // 2022-01-01 is a Saturday.
        let jan1 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let jan2 = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let dec31 = Utc.with_ymd_and_hms(2021, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(format_date("w", &jan1), "1");
        assert_eq!(format_date("ww", &jan2), "02");
        assert_eq!(format_date("w", &dec31), "1");
    }

    #[test]
    fn ordinal_suffixes() {
        let days: Vec<_> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
            .into_iter()
            .map(ordinal)
            .collect();
        assert_eq!(
            days,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "31st"]
        );
    }
}
