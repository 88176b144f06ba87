// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep") - Permissive Numeric Parsing

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Loose coercion (aggregator payloads carry figures as "1,234.56"-style text)
// ---------------------------------------------------------------------------

/// Coerce a numeric-like string to f64: strip every character outside
/// [0-9.-], then parse. Unparseable or non-finite input becomes 0.0.
pub fn loose_f64(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Like [`loose_f64`] but substitutes `fallback` when the coercion lands on
/// zero. Quote prices use this so a dead feed still yields displayable
/// ETH-denominated figures.
pub fn loose_f64_or(raw: &str, fallback: f64) -> f64 {
    let v = loose_f64(raw);
    if v == 0.0 {
        fallback
    } else {
        v
    }
}

/// True when `v` is finite and strictly positive.
pub fn finite_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

// ---------------------------------------------------------------------------
// Serde glue - listing fields arrive as numbers, strings, or nothing
// ---------------------------------------------------------------------------

/// Deserialize a price that may be a JSON number, a numeric-like string, or
/// null. Malformed values coerce to 0.0 instead of failing the payload.
pub fn de_loose_f64<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(de)? {
        Some(Raw::Num(v)) if v.is_finite() => v,
        Some(Raw::Text(s)) => loose_f64(&s),
        _ => 0.0,
    })
}

/// Deserialize an identifier that may be a JSON string or number. Token ids
/// are opaque to the engine, so everything becomes a string.
pub fn de_string_like<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Num(f64),
    }

    Ok(match Option::<Raw>::deserialize(de)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Num(v)) if v.fract() == 0.0 && v.abs() < 9.0e18 => format!("{}", v as i64),
        Some(Raw::Num(v)) => v.to_string(),
        None => String::new(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(loose_f64("1.5"), 1.5);
        assert_eq!(loose_f64("-0.25"), -0.25);
        assert_eq!(loose_f64("42"), 42.0);
    }

    #[test]
    fn test_strips_decoration() {
        assert_eq!(loose_f64("$1,234.56"), 1234.56);
        assert_eq!(loose_f64("1.5 ETH"), 1.5);
        assert_eq!(loose_f64(" 3000 "), 3000.0);
    }

    #[test]
    fn test_garbage_coerces_to_zero() {
        assert_eq!(loose_f64(""), 0.0);
        assert_eq!(loose_f64("abc"), 0.0);
        assert_eq!(loose_f64("-"), 0.0);
        assert_eq!(loose_f64("1.2.3"), 0.0);
    }

    #[test]
    fn test_fallback_on_zero() {
        assert_eq!(loose_f64_or("0", 3000.0), 3000.0);
        assert_eq!(loose_f64_or("garbage", 3000.0), 3000.0);
        assert_eq!(loose_f64_or("2850.5", 3000.0), 2850.5);
        // Negative values are kept as-is; only zero triggers the fallback
        assert_eq!(loose_f64_or("-5", 3000.0), -5.0);
    }

    #[test]
    fn test_finite_positive() {
        assert!(finite_positive(0.001));
        assert!(!finite_positive(0.0));
        assert!(!finite_positive(-1.0));
        assert!(!finite_positive(f64::NAN));
        assert!(!finite_positive(f64::INFINITY));
    }

    #[test]
    fn test_de_loose_f64_variants() {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "de_loose_f64")]
            price: f64,
        }

        let n: Row = serde_json::from_str(r#"{"price": 0.42}"#).unwrap();
        assert_eq!(n.price, 0.42);

        let s: Row = serde_json::from_str(r#"{"price": "1,250.5"}"#).unwrap();
        assert_eq!(s.price, 1250.5);

        let bad: Row = serde_json::from_str(r#"{"price": "n/a"}"#).unwrap();
        assert_eq!(bad.price, 0.0);

        let null: Row = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(null.price, 0.0);

        let missing: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(missing.price, 0.0);
    }

    #[test]
    fn test_de_string_like_variants() {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "de_string_like")]
            id: String,
        }

        let s: Row = serde_json::from_str(r#"{"id": "8721"}"#).unwrap();
        assert_eq!(s.id, "8721");

        let n: Row = serde_json::from_str(r#"{"id": 8721}"#).unwrap();
        assert_eq!(n.id, "8721");

        let null: Row = serde_json::from_str(r#"{"id": null}"#).unwrap();
        assert_eq!(null.id, "");
    }
}
