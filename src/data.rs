use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Bitcoin,
    Ethereum,
    Litecoin,
    Ripple,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [
        Symbol::Bitcoin,
        Symbol::Ethereum,
        Symbol::Litecoin,
        Symbol::Ripple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Bitcoin => "Bitcoin",
            Symbol::Ethereum => "Ethereum",
            Symbol::Litecoin => "Litecoin",
            Symbol::Ripple => "Ripple",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize_symbol(s)?;
        Symbol::ALL
            .into_iter()
            .find(|symbol| symbol.as_str() == name)
            .ok_or_else(|| AppError::InvalidRequest(format!("Unknown symbol: {}", s)))
    }
}

/// Canonical stored form of a symbol name: first letter upper case, rest lower case.
pub fn normalize_symbol(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();

    match chars.next() {
        Some(first) => Ok(first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()),
        None => Err(AppError::InvalidRequest("crypto symbol must not be empty".to_string())),
    }
}

/// One price about to be written; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrice {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Half-open `[start, end)` timestamp window covering whole calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        let next_day = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::InvalidRequest(format!("End date out of range: {}", end)))?;

        Ok(Self {
            start: start.and_time(chrono::NaiveTime::MIN).and_utc(),
            end: next_day.and_time(chrono::NaiveTime::MIN).and_utc(),
        })
    }

    pub fn parse(start: Option<&str>, end: Option<&str>) -> AppResult<Self> {
        let start = parse_date("start", start)?;
        let end = parse_date("end", end)?;
        Self::from_dates(start, end)
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start && *timestamp < self.end
    }
}

fn parse_date(field: &str, value: Option<&str>) -> AppResult<NaiveDate> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidRequest(format!("{} date is required", field)))?;

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid {} date '{}': {}", field, value, e)))
}
