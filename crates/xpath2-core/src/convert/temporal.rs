//! Lexical parsing of XML Schema date, time and duration values.

use chrono::{Duration as ChronoDuration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use core::str::FromStr;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TemporalErr;

type TResult<T> = Result<T, TemporalErr>;

fn digits(s: &str, len: usize) -> TResult<u32> {
    if s.len() != len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TemporalErr);
    }
    s.parse().map_err(|_| TemporalErr)
}

/// Split a trailing timezone (`Z`, `+hh:mm`, `-hh:mm`) off `s`.
pub(crate) fn split_tz(s: &str) -> TResult<(&str, Option<FixedOffset>)> {
    if let Some(body) = s.strip_suffix('Z') {
        return Ok((body, FixedOffset::east_opt(0)));
    }
    if s.len() >= 6 && s.is_char_boundary(s.len() - 6) {
        let (body, tz) = s.split_at(s.len() - 6);
        let bytes = tz.as_bytes();
        if tz.is_ascii() && (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' {
            let hours = digits(&tz[1..3], 2)?;
            let minutes = digits(&tz[4..6], 2)?;
            if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
                return Err(TemporalErr);
            }
            let secs = i32::try_from(hours * 3600 + minutes * 60).map_err(|_| TemporalErr)?;
            let secs = if bytes[0] == b'-' { -secs } else { secs };
            return Ok((body, Some(FixedOffset::east_opt(secs).ok_or(TemporalErr)?)));
        }
    }
    Ok((s, None))
}

/// `-?YYYY` with at least four digits and no leading zero beyond four.
fn parse_year(s: &str) -> TResult<i32> {
    let (neg, body) = match s.strip_prefix('-') {
        Some(b) => (true, b),
        None => (false, s),
    };
    if body.len() < 4 || !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TemporalErr);
    }
    if body.len() > 4 && body.starts_with('0') {
        return Err(TemporalErr);
    }
    let year: i32 = body.parse().map_err(|_| TemporalErr)?;
    if year == 0 {
        return Err(TemporalErr);
    }
    Ok(if neg { -year } else { year })
}

/// Position of the `-` separating year from month (skipping a leading sign).
fn year_split(s: &str) -> TResult<(&str, &str)> {
    let start = usize::from(s.starts_with('-'));
    let idx = s[start..].find('-').ok_or(TemporalErr)? + start;
    Ok((&s[..idx], &s[idx + 1..]))
}

fn month(s: &str) -> TResult<u8> {
    let m = digits(s, 2)?;
    if (1..=12).contains(&m) {
        u8::try_from(m).map_err(|_| TemporalErr)
    } else {
        Err(TemporalErr)
    }
}

fn days_in_month(m: u8) -> u8 {
    match m {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn day(s: &str, max: u8) -> TResult<u8> {
    let d = u8::try_from(digits(s, 2)?).map_err(|_| TemporalErr)?;
    if (1..=max).contains(&d) {
        Ok(d)
    } else {
        Err(TemporalErr)
    }
}

fn date_body(s: &str) -> TResult<NaiveDate> {
    let (y, rest) = year_split(s)?;
    let (m, d) = rest.split_once('-').ok_or(TemporalErr)?;
    let year = parse_year(y)?;
    let m = month(m)?;
    let d = day(d, 31)?;
    NaiveDate::from_ymd_opt(year, u32::from(m), u32::from(d)).ok_or(TemporalErr)
}

/// Returns the time plus `true` when the input was `24:00:00` (end of day).
fn time_body(s: &str) -> TResult<(NaiveTime, bool)> {
    let mut parts = s.splitn(3, ':');
    let h = digits(parts.next().ok_or(TemporalErr)?, 2)?;
    let m = digits(parts.next().ok_or(TemporalErr)?, 2)?;
    let sec_part = parts.next().ok_or(TemporalErr)?;
    let (sec_str, frac) = match sec_part.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (sec_part, None),
    };
    let sec = digits(sec_str, 2)?;
    let nanos = match frac {
        None => 0,
        Some(f) if !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()) => {
            let mut padded: String = f.chars().take(9).collect();
            while padded.len() < 9 {
                padded.push('0');
            }
            padded.parse::<u32>().map_err(|_| TemporalErr)?
        }
        Some(_) => return Err(TemporalErr),
    };
    if h == 24 {
        if m == 0 && sec == 0 && nanos == 0 {
            return Ok((NaiveTime::MIN, true));
        }
        return Err(TemporalErr);
    }
    if m > 59 || sec > 59 {
        return Err(TemporalErr);
    }
    NaiveTime::from_hms_nano_opt(h, m, sec, nanos)
        .map(|t| (t, false))
        .ok_or(TemporalErr)
}

pub(crate) fn parse_date_lex(s: &str) -> TResult<(NaiveDate, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    Ok((date_body(body)?, tz))
}

pub(crate) fn parse_time_lex(s: &str) -> TResult<(NaiveTime, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    let (t, _) = time_body(body)?;
    Ok((t, tz))
}

pub(crate) fn parse_date_time_lex(s: &str) -> TResult<(NaiveDateTime, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    let (d, t) = body.split_once('T').ok_or(TemporalErr)?;
    let date = date_body(d)?;
    let (time, end_of_day) = time_body(t)?;
    let mut dt = date.and_time(time);
    if end_of_day {
        dt = dt
            .checked_add_signed(ChronoDuration::days(1))
            .ok_or(TemporalErr)?;
    }
    Ok((dt, tz))
}

pub(crate) fn parse_g_year(s: &str) -> TResult<(i32, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    Ok((parse_year(body)?, tz))
}

pub(crate) fn parse_g_year_month(s: &str) -> TResult<(i32, u8, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    let (y, m) = year_split(body)?;
    Ok((parse_year(y)?, month(m)?, tz))
}

pub(crate) fn parse_g_month(s: &str) -> TResult<(u8, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    let m = body.strip_prefix("--").ok_or(TemporalErr)?;
    Ok((month(m)?, tz))
}

pub(crate) fn parse_g_month_day(s: &str) -> TResult<(u8, u8, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    let rest = body.strip_prefix("--").ok_or(TemporalErr)?;
    let (m, d) = rest.split_once('-').ok_or(TemporalErr)?;
    let m = month(m)?;
    Ok((m, day(d, days_in_month(m))?, tz))
}

pub(crate) fn parse_g_day(s: &str) -> TResult<(u8, Option<FixedOffset>)> {
    let (body, tz) = split_tz(s)?;
    let d = body.strip_prefix("---").ok_or(TemporalErr)?;
    Ok((day(d, 31)?, tz))
}

/// Components present in a duration literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DurationParts {
    pub(crate) has_year_month: bool,
    pub(crate) has_day_time: bool,
}

/// `-?PnYnMnDTnHnMn.nS` into (months, seconds); both carry the sign.
pub(crate) fn parse_duration_lex(s: &str) -> TResult<(i32, Decimal, DurationParts)> {
    let (neg, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s),
    };
    let body = rest.strip_prefix('P').ok_or(TemporalErr)?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((d, t)) => {
            if t.is_empty() {
                return Err(TemporalErr);
            }
            (d, Some(t))
        }
        None => (body, None),
    };
    let mut parts = DurationParts::default();
    let mut months: i64 = 0;
    let mut seconds = Decimal::ZERO;
    let mut seen_any = false;

    let mut order = 0;
    let mut num = String::new();
    for ch in date_part.chars() {
        if ch.is_ascii_digit() {
            num.push(ch);
            continue;
        }
        let rank = match ch {
            'Y' => 1,
            'M' => 2,
            'D' => 3,
            _ => return Err(TemporalErr),
        };
        if num.is_empty() || rank <= order {
            return Err(TemporalErr);
        }
        order = rank;
        let n: i64 = num.parse().map_err(|_| TemporalErr)?;
        num.clear();
        seen_any = true;
        match ch {
            'Y' => {
                months = n
                    .checked_mul(12)
                    .and_then(|y| months.checked_add(y))
                    .ok_or(TemporalErr)?;
                parts.has_year_month = true;
            }
            'M' => {
                months = months.checked_add(n).ok_or(TemporalErr)?;
                parts.has_year_month = true;
            }
            _ => {
                seconds = Decimal::from(n)
                    .checked_mul(Decimal::from(86_400))
                    .and_then(|d| seconds.checked_add(d))
                    .ok_or(TemporalErr)?;
                parts.has_day_time = true;
            }
        }
    }
    if !num.is_empty() {
        return Err(TemporalErr);
    }

    if let Some(tp) = time_part {
        let mut order = 0;
        for ch in tp.chars() {
            if ch.is_ascii_digit() || ch == '.' {
                num.push(ch);
                continue;
            }
            let (rank, factor) = match ch {
                'H' => (1, 3600),
                'M' => (2, 60),
                'S' => (3, 1),
                _ => return Err(TemporalErr),
            };
            if num.is_empty() || rank <= order || (rank != 3 && num.contains('.')) {
                return Err(TemporalErr);
            }
            if num.starts_with('.') || num.ends_with('.') {
                return Err(TemporalErr);
            }
            order = rank;
            let n = Decimal::from_str(&num).map_err(|_| TemporalErr)?;
            num.clear();
            seen_any = true;
            seconds = n
                .checked_mul(Decimal::from(factor))
                .and_then(|d| seconds.checked_add(d))
                .ok_or(TemporalErr)?;
            parts.has_day_time = true;
        }
        if !num.is_empty() {
            return Err(TemporalErr);
        }
    }
    if !seen_any {
        return Err(TemporalErr);
    }
    let months = i32::try_from(months).map_err(|_| TemporalErr)?;
    if neg {
        Ok((-months, -seconds, parts))
    } else {
        Ok((months, seconds, parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time_end_of_day_rolls_over() {
        let (dt, tz) = parse_date_time_lex("2024-02-28T24:00:00Z").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(tz, FixedOffset::east_opt(0));
    }

    #[test]
    fn timezone_bounds() {
        assert!(split_tz("2020-01-01+14:00").is_ok());
        assert!(split_tz("2020-01-01+14:30").is_err());
        let (_, tz) = split_tz("10:00:00-05:30").unwrap();
        assert_eq!(tz, FixedOffset::west_opt(5 * 3600 + 30 * 60));
    }

    #[test]
    fn duration_components() {
        let (m, s, parts) = parse_duration_lex("-P1Y2M3DT4H5M6.5S").unwrap();
        assert_eq!(m, -14);
        assert_eq!(s, Decimal::from_str("-273906.5").unwrap());
        assert!(parts.has_year_month && parts.has_day_time);
        assert!(parse_duration_lex("P").is_err());
        assert!(parse_duration_lex("PT").is_err());
        assert!(parse_duration_lex("P1M1Y").is_err());
    }

    #[test]
    fn g_month_day_respects_month_length() {
        assert!(parse_g_month_day("--02-29").is_ok());
        assert!(parse_g_month_day("--04-31").is_err());
    }
}
