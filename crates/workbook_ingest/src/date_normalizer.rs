//! Turns whatever a user typed (or a spreadsheet program stored) in a date cell
//! into a calendar date.
//!
//! Strings go through an ordered chain of fixed formats; the first one that
//! parses wins. Day-first formats come before month-first ones, so an
//! ambiguous `01/02/2024` is the 1st of February. If no fixed format matches,
//! a lenient day-first parser gets the last word.

use calamine::Data;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// Serials at or below this value (1970-01-01) are treated as misparsed numbers,
/// not dates.
pub const MIN_SERIAL_EXCLUSIVE: f64 = 25569.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    DayMonthYear,
    YearMonthDay,
    MonthDayYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearWidth {
    Full,
    Short,
}

/// One exact date layout, e.g. `DD/MM/YYYY`.
#[derive(Debug, Clone, Copy)]
pub struct FixedFormat {
    pub label: &'static str,
    separator: char,
    order: FieldOrder,
    year: YearWidth,
}

impl FixedFormat {
    const fn new(label: &'static str, separator: char, order: FieldOrder, year: YearWidth) -> Self {
        Self {
            label,
            separator,
            order,
            year,
        }
    }

    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        let mut parts = s.split(self.separator);
        let (a, b, c) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let (day, month, year) = match self.order {
            FieldOrder::DayMonthYear => (a, b, c),
            FieldOrder::YearMonthDay => (c, b, a),
            FieldOrder::MonthDayYear => (b, a, c),
        };

        let day = short_field(day)?;
        let month = short_field(month)?;
        let year = match self.year {
            YearWidth::Full => full_year(year)?,
            YearWidth::Short => pivot_year(two_digit_year(year)?),
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// The fixed chain, in the order it is tried. Order matters: see module docs.
pub const FIXED_FORMATS: [FixedFormat; 8] = [
    FixedFormat::new("DD/MM/YYYY", '/', FieldOrder::DayMonthYear, YearWidth::Full),
    FixedFormat::new("DD-MM-YYYY", '-', FieldOrder::DayMonthYear, YearWidth::Full),
    FixedFormat::new("YYYY-MM-DD", '-', FieldOrder::YearMonthDay, YearWidth::Full),
    FixedFormat::new("YYYY/MM/DD", '/', FieldOrder::YearMonthDay, YearWidth::Full),
    FixedFormat::new("DD/MM/YY", '/', FieldOrder::DayMonthYear, YearWidth::Short),
    FixedFormat::new("DD-MM-YY", '-', FieldOrder::DayMonthYear, YearWidth::Short),
    FixedFormat::new("MM/DD/YYYY", '/', FieldOrder::MonthDayYear, YearWidth::Full),
    FixedFormat::new("MM-DD-YYYY", '-', FieldOrder::MonthDayYear, YearWidth::Full),
];

/// Normalizes a raw cell. `None` means the value cannot be read as a date.
pub fn normalize(raw: &Data) -> Option<NaiveDate> {
    match raw {
        Data::DateTime(dt) if !dt.is_duration() => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) => normalize_str(s),
        Data::Float(f) => from_serial(*f),
        Data::Int(i) => from_serial(*i as f64),
        Data::String(s) => normalize_str(s),
        _ => None,
    }
}

/// Runs the string chain: fixed formats first, lenient fallback last.
pub fn normalize_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    FIXED_FORMATS
        .iter()
        .find_map(|format| format.parse(s))
        .or_else(|| parse_lenient_day_first(s))
}

/// Spreadsheet serial date with day 0 = 1899-12-30. The time-of-day fraction
/// is dropped.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= MIN_SERIAL_EXCLUSIVE {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(Days::new(serial.trunc() as u64))
}

const LENIENT_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

const LENIENT_NAMED_MONTH_FORMATS: [&str; 8] = [
    "%d %b %Y",
    "%d-%b-%Y",
    "%d/%b/%Y",
    "%d %b, %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%A, %d %b %Y",
    "%A %d %b %Y",
];

/// Fallback for strings none of the fixed formats accept. Prefers day-first
/// when the field order is ambiguous and swaps to month-first only when the
/// day-first reading is not a valid date.
pub fn parse_lenient_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in LENIENT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in LENIENT_NAMED_MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year = s[0..4].parse().ok()?;
        let month = s[4..6].parse().ok()?;
        let day = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    parse_numeric_triplet(s)
}

/// `15.01.2024`, `15 1 24`, `2024.01.15`: any of `.`, `/`, `-` or spaces as
/// separators.
fn parse_numeric_triplet(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s
        .split(|c: char| c == '.' || c == '/' || c == '-' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 || !parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    if parts[0].len() == 4 {
        let year = full_year(parts[0])?;
        return NaiveDate::from_ymd_opt(year, short_field(parts[1])?, short_field(parts[2])?);
    }

    let year = match parts[2].len() {
        4 => full_year(parts[2])?,
        1 | 2 => pivot_year(parts[2].parse().ok()?),
        _ => return None,
    };
    let first = short_field(parts[0])?;
    let second = short_field(parts[1])?;

    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

/// Day or month: one or two digits.
fn short_field(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn full_year(s: &str) -> Option<i32> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn two_digit_year(s: &str) -> Option<i32> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// 00-68 map to 2000-2068, 69-99 to 1969-1999.
fn pivot_year(yy: i32) -> i32 {
    if yy < 69 {
        2000 + yy
    } else {
        1900 + yy
    }
}
