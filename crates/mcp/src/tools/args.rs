//! Argument decoding and validation shared by the tools.
//!
//! Everything here runs before any upstream request is made.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;

/// Decode tool arguments; a missing argument object counts as `{}`.
pub fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).with_context(|| format!("Invalid arguments for {}", tool))
}

/// Trimmed, non-empty text.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        bail!("{} is required and must not be empty", field);
    }
    Ok(value)
}

/// Result count, defaulting to 20.
pub fn check_limit(limit: Option<u32>) -> Result<u32> {
    let limit = limit.unwrap_or(courtlistener_sdk::api::DEFAULT_LIMIT);
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        bail!(
            "limit must be between {} and {}, got {}",
            MIN_LIMIT,
            MAX_LIMIT,
            limit
        );
    }
    Ok(limit)
}

/// Bounded integer argument.
pub fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<u32> {
    if !(min..=max).contains(&value) {
        bail!("{} must be between {} and {}, got {}", field, min, max, value);
    }
    Ok(value)
}

/// Sort order from `allowed`; absent means the first entry.
pub fn check_order_by(order_by: &Option<String>, allowed: &[&str]) -> Result<()> {
    match order_by.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        None => Ok(()),
        Some(order) if allowed.contains(&order) => Ok(()),
        Some(order) => bail!(
            "order_by must be one of {}, got {:?}",
            allowed
                .iter()
                .map(|o| format!("'{}'", o))
                .collect::<Vec<_>>()
                .join(", "),
            order
        ),
    }
}

/// Optional `YYYY-MM-DD` date; empty strings count as absent.
pub fn check_date(field: &str, value: &Option<String>) -> Result<Option<NaiveDate>> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| anyhow!("{} must be a date in YYYY-MM-DD format, got {:?}", field, raw)),
    }
}

/// Both dates valid, and `after` not later than `before`.
pub fn check_date_range(
    after_field: &str,
    after: &Option<String>,
    before_field: &str,
    before: &Option<String>,
) -> Result<()> {
    let start = check_date(after_field, after)?;
    let end = check_date(before_field, before)?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            bail!("{} ({}) is later than {} ({})", after_field, start, before_field, end);
        }
    }
    Ok(())
}

/// Citation-count bounds; zero means unset.
pub fn check_cited(cited_gt: Option<u32>, cited_lt: Option<u32>) -> Result<()> {
    if let (Some(gt), Some(lt)) = (cited_gt, cited_lt) {
        if gt > 0 && lt > 0 && gt > lt {
            bail!("cited_gt ({}) must not exceed cited_lt ({})", gt, lt);
        }
    }
    Ok(())
}

/// Positive integer id given as a JSON number or a numeric string.
pub fn parse_id(field: &str, value: &Value) -> Result<u64> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Null => bail!("{} is required", field),
        _ => None,
    };
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => bail!("{} must be a positive integer, got {}", field, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_limit() {
        assert_eq!(check_limit(None).unwrap(), 20);
        assert_eq!(check_limit(Some(100)).unwrap(), 100);
        assert!(check_limit(Some(0)).is_err());
        assert!(check_limit(Some(101)).is_err());
    }

    #[test]
    fn test_check_order_by() {
        let allowed = ["score desc", "name asc"];
        assert!(check_order_by(&None, &allowed).is_ok());
        assert!(check_order_by(&Some("name asc".into()), &allowed).is_ok());
        let err = check_order_by(&Some("dateFiled desc".into()), &allowed).unwrap_err();
        assert!(err.to_string().contains("'score desc', 'name asc'"));
    }

    #[test]
    fn test_check_dates() {
        assert!(check_date("filed_after", &Some("2020-02-30".into())).is_err());
        assert!(check_date("filed_after", &Some("".into())).unwrap().is_none());
        assert!(check_date_range(
            "filed_after",
            &Some("2021-01-01".into()),
            "filed_before",
            &Some("2020-01-01".into())
        )
        .is_err());
        assert!(check_date_range(
            "filed_after",
            &Some("2020-01-01".into()),
            "filed_before",
            &Some("2020-01-01".into())
        )
        .is_ok());
    }

    #[test]
    fn test_check_cited() {
        assert!(check_cited(Some(10), Some(5)).is_err());
        assert!(check_cited(Some(10), Some(0)).is_ok());
        assert!(check_cited(Some(5), Some(10)).is_ok());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("opinion_id", &json!(108713)).unwrap(), 108713);
        assert_eq!(parse_id("opinion_id", &json!(" 42 ")).unwrap(), 42);
        assert!(parse_id("opinion_id", &json!(0)).is_err());
        assert!(parse_id("opinion_id", &json!(-3)).is_err());
        assert!(parse_id("opinion_id", &json!("abc")).is_err());
        assert!(parse_id("opinion_id", &Value::Null).is_err());
    }

    #[test]
    fn test_parse_args_accepts_null() {
        #[derive(serde::Deserialize)]
        struct Args {
            #[serde(default)]
            q: String,
        }
        let args: Args = parse_args("opinions", Value::Null).unwrap();
        assert!(args.q.is_empty());
    }
}
