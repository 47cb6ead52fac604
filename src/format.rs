//! Checkers for the `format` keyword.
//!
//! Draft 7 treats `format` as an annotation unless the validator opts in, see
//! [`Config::assert_formats`](../validator/struct.Config.html#method.assert_formats).
//! Checkers are plain function pointers registered by name; formats without a
//! checker always pass.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::Url;

/// Returns whether a string conforms to a format.
pub type FormatChecker = fn(&str) -> bool;

/// The checkers every [`Config`](../validator/struct.Config.html) starts with.
pub fn builtin() -> BTreeMap<String, FormatChecker> {
    let checkers: [(&str, FormatChecker); 8] = [
        ("date-time", date_time),
        ("date", date),
        ("time", time),
        ("email", email),
        ("uri", uri),
        ("regex", regex),
        ("ipv4", ipv4),
        ("ipv6", ipv6),
    ];

    checkers
        .iter()
        .map(|(name, checker)| ((*name).to_owned(), *checker))
        .collect()
}

fn date_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

fn date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(&format!("1970-01-01T{}", s)).is_ok()
}

fn email(s: &str) -> bool {
    let mut parts = s.rsplitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(domain), Some(local)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains(char::is_whitespace)
        }
        _ => false,
    }
}

fn uri(s: &str) -> bool {
    Url::parse(s).is_ok()
}

fn regex(s: &str) -> bool {
    Regex::new(s).is_ok()
}

fn ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

fn ipv6(s: &str) -> bool {
    s.parse::<Ipv6Addr>().is_ok()
}
