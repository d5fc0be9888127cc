//! Разбор времени сеансов.
//!
//! В документах расписания время встречается в нескольких форматах.
//! Парсим каскадом на границе и приводим к `NaiveDateTime`; если ни один
//! формат не подошёл, это ошибка, а не `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized timestamp '{0}'")]
pub struct TimeParseError(pub String);

/// RFC 3339 с зоной переводится в локальное время сеанса (зона отбрасывается).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, TimeParseError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| TimeParseError(raw.to_string()))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, TimeParseError> {
    let s = raw.trim();
    ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| TimeParseError(raw.to_string()))
}

/// Каноническое представление для ответов API.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
