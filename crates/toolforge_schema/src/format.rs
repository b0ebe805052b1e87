//! Matchers for named string formats and ISO-8601 temporal values.
//!
//! The temporal helpers parse and re-serialize, returning the normalized
//! representation, so that equal instants always produce equal strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use std::net::Ipv4Addr;
use url::Url;
use uuid::Uuid;

/// Maximum hostname length in octets
const MAX_HOSTNAME_LEN: usize = 253;
/// Maximum DNS label length
const MAX_LABEL_LEN: usize = 63;
/// Maximum local-part length of an email address
const MAX_LOCAL_PART_LEN: usize = 64;

/// RFC 1123 hostname
#[must_use]
pub fn is_hostname(value: &str) -> bool {
    let value = value.strip_suffix('.').unwrap_or(value);
    if value.is_empty() || value.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    value.split('.').all(is_label)
}

fn is_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Pragmatic email check: dot-atom local part and a dotted hostname domain
#[must_use]
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > MAX_LOCAL_PART_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c));
    local_ok && domain.contains('.') && !domain.ends_with('.') && is_hostname(domain)
}

/// Absolute URL that names a host
#[must_use]
pub fn is_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.has_host())
}

/// Hyphenated UUID (`8-4-4-4-12`)
#[must_use]
pub fn is_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}

/// Dotted-quad IPv4 address without leading zeros
#[must_use]
pub fn is_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok()
}

/// Check that `value` matches a layout where `d` is an ASCII digit and
/// every other byte must match literally
fn has_shape(value: &str, layout: &str) -> bool {
    value.len() == layout.len()
        && value.bytes().zip(layout.bytes()).all(|(v, l)| match l {
            b'd' => v.is_ascii_digit(),
            _ => v == l,
        })
}

/// Split an optional `.fraction` suffix (1–9 digits) off a time string
fn split_fraction(value: &str) -> Option<(&str, Option<&str>)> {
    match value.split_once('.') {
        None => Some((value, None)),
        Some((head, frac))
            if !frac.is_empty() && frac.len() <= 9 && frac.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Some((head, Some(frac)))
        }
        Some(_) => None,
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let (head, frac) = split_fraction(value)?;
    if has_shape(head, "dd:dd:dd") {
        NaiveTime::parse_from_str(value, "%H:%M:%S%.f").ok()
    } else if has_shape(head, "dd:dd") && frac.is_none() {
        NaiveTime::parse_from_str(value, "%H:%M").ok()
    } else {
        None
    }
}

/// Parse `YYYY-MM-DD`; returns the normalized form
#[must_use]
pub fn normalize_date(value: &str) -> Option<String> {
    if !has_shape(value, "dddd-dd-dd") {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Parse `HH:MM`, `HH:MM:SS` or `HH:MM:SS.fff`; returns `HH:MM:SS[.fff]`
#[must_use]
pub fn normalize_time(value: &str) -> Option<String> {
    parse_time(value).map(|t| t.format("%H:%M:%S%.f").to_string())
}

/// Parse an ISO-8601 date-time; returns UTC RFC 3339 with a `Z` suffix
///
/// Values with an offset are converted to UTC. Values without an offset
/// are taken to be UTC already.
#[must_use]
pub fn normalize_datetime(value: &str) -> Option<String> {
    let (date, rest) = value.split_at_checked(10)?;
    if !has_shape(date, "dddd-dd-dd") || !(rest.starts_with('T') || rest.starts_with('t')) {
        return None;
    }

    let utc = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let time = parse_time(&rest[1..])?;
            NaiveDateTime::new(date, time).and_utc()
        }
    };

    Some(utc.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
