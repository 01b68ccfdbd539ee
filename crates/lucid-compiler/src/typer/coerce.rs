//! Literal text to typed values.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Decimal number, `_` digit separators allowed.
pub fn number(text: &str) -> Option<f64> {
    let digits: String = text.trim().chars().filter(|&c| c != '_').collect();
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Epoch nanoseconds.
///
/// Each layout is tried in order, first as a zoned datetime, then as a
/// naive datetime in UTC, then as a date at midnight UTC. RFC 3339 and
/// bare unix seconds are the fallbacks.
pub fn datetime(text: &str, layouts: &[String]) -> Option<i64> {
    let text = text.trim();
    for layout in layouts {
        if let Ok(zoned) = DateTime::parse_from_str(text, layout) {
            return zoned.timestamp_nanos_opt();
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return naive.and_utc().timestamp_nanos_opt();
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, layout) {
            return date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_nanos_opt();
        }
    }
    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return zoned.timestamp_nanos_opt();
    }
    text.parse::<i64>().ok()?.checked_mul(NANOS_PER_SECOND)
}

pub fn ip(text: &str) -> Option<IpAddr> {
    text.trim().parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CidrError {
    #[error("`{0}` is not a valid IP address")]
    Address(String),
    #[error("`{0}` is not a valid prefix length")]
    PrefixLength(String),
    #[error("prefix length {len} exceeds {max} bits")]
    TooLong { len: u8, max: u8 },
}

/// Network address and prefix length of `addr/len`.
pub fn cidr(text: &str) -> Result<(IpAddr, u8), CidrError> {
    let (addr, len) = text
        .trim()
        .split_once('/')
        .ok_or_else(|| CidrError::PrefixLength(String::new()))?;
    let network = ip(addr).ok_or_else(|| CidrError::Address(addr.to_string()))?;
    let prefix_len: u8 = len
        .parse()
        .map_err(|_| CidrError::PrefixLength(len.to_string()))?;
    let max = match network {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    if prefix_len > max {
        return Err(CidrError::TooLong {
            len: prefix_len,
            max,
        });
    }
    Ok((network, prefix_len))
}

/// Looks like `addr/len` rather than a plain address.
pub fn is_cidr(text: &str) -> bool {
    text.contains('/')
}
