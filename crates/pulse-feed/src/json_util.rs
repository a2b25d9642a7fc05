//! Shared JSON parsing helpers used by the fetch sources.
//!
//! Exchanges encode numbers either as JSON strings (`"30000.5"`) or as native
//! numbers (`30000.5`); these helpers accept both.

/// Parse a JSON value (string or number) as `f64`.
#[inline]
pub fn parse_str_f64(v: Option<&serde_json::Value>) -> Option<f64> {
    let v = v?;
    if let Some(s) = v.as_str() {
        fast_float2::parse(s).ok()
    } else {
        v.as_f64()
    }
}

/// Parse a JSON value (string or integer) as `i64`.
#[inline]
pub fn parse_str_i64(v: Option<&serde_json::Value>) -> Option<i64> {
    let v = v?;
    if let Some(s) = v.as_str() {
        s.trim().parse().ok()
    } else {
        v.as_i64()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn f64_from_string_or_number() {
        assert_eq!(parse_str_f64(Some(&json!("30000.5"))), Some(30000.5));
        assert_eq!(parse_str_f64(Some(&json!(42.25))), Some(42.25));
        assert_eq!(parse_str_f64(Some(&json!("abc"))), None);
        assert_eq!(parse_str_f64(Some(&json!(null))), None);
        assert_eq!(parse_str_f64(None), None);
    }

    #[test]
    fn i64_from_string_or_number() {
        assert_eq!(parse_str_i64(Some(&json!(1_700_000_000))), Some(1_700_000_000));
        assert_eq!(parse_str_i64(Some(&json!("70"))), Some(70));
        assert_eq!(parse_str_i64(Some(&json!("7.5"))), None);
    }
}
