//! Per-type value recognizers and the type → {validator, normalizer} table.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::input::Value;
use crate::schema::DetectedType;
use crate::transform::operations;

use super::dates::parse_date;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static IBAN_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}\d{2}[A-Z0-9]{11,30}$").unwrap());

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "ws", "wss"];

const TRUE_TOKENS: &[&str] = &["true", "yes", "1", "oui"];
const FALSE_TOKENS: &[&str] = &["false", "no", "0", "non"];

/// Options that change how ambiguous values are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Read `03/04/2024` as 3 April rather than March 4.
    pub day_first: bool,
}

/// Does a value belong to a type.
pub type Validator = fn(&Value, ParseOptions) -> bool;

/// Canonical form of a value, or `None` when it cannot be normalized.
pub type Normalizer = fn(&Value, ParseOptions) -> Option<Value>;

/// Recognition and normalization rules for one semantic type.
#[derive(Debug, Clone, Copy)]
pub struct TypeRule {
    pub detected_type: DetectedType,
    pub validator: Validator,
    pub normalizer: Option<Normalizer>,
}

/// Rules in detection priority order: earlier entries win ties.
pub static TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        detected_type: DetectedType::Number,
        validator: |v, _| is_number(v),
        normalizer: None,
    },
    TypeRule {
        detected_type: DetectedType::Date,
        validator: is_date,
        normalizer: Some(operations::standardize_date),
    },
    TypeRule {
        detected_type: DetectedType::Email,
        validator: |v, _| is_email(v),
        normalizer: Some(|v, _| operations::standardize_email(v)),
    },
    TypeRule {
        detected_type: DetectedType::Phone,
        validator: |v, _| is_phone(v),
        normalizer: Some(|v, _| operations::standardize_phone(v)),
    },
    TypeRule {
        detected_type: DetectedType::Url,
        validator: |v, _| is_url(v),
        normalizer: None,
    },
    TypeRule {
        detected_type: DetectedType::Boolean,
        validator: |v, _| is_boolean(v),
        normalizer: None,
    },
    TypeRule {
        detected_type: DetectedType::Iban,
        validator: |v, _| is_iban(v),
        normalizer: Some(|v, _| operations::standardize_iban(v)),
    },
];

/// Look up the rule for a type. Text and unknown have none.
pub fn rule_for(detected_type: DetectedType) -> Option<&'static TypeRule> {
    TYPE_RULES.iter().find(|r| r.detected_type == detected_type)
}

/// Validate a value against a type. Types without a rule accept everything.
pub fn validate(detected_type: DetectedType, value: &Value, options: ParseOptions) -> bool {
    rule_for(detected_type).is_none_or(|rule| (rule.validator)(value, options))
}

// =============================================================================
// NUMBER
// =============================================================================

/// Parse a numeric cell.
///
/// Leading `+` and leading zeros before a digit are rejected: those are
/// phone numbers and identifiers. A single decimal comma is accepted when
/// there is no dot.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Text(s) => parse_number_str(s),
        _ => None,
    }
}

fn parse_number_str(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s.starts_with('+') {
        return None;
    }

    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let mut chars = unsigned.chars();
    if let (Some('0'), Some(next)) = (chars.next(), chars.next()) {
        if next.is_ascii_digit() {
            return None;
        }
    }

    let commas = s.matches(',').count();
    let normalized;
    let candidate = if commas == 0 {
        s
    } else if commas == 1 && !s.contains('.') {
        normalized = s.replace(',', ".");
        normalized.as_str()
    } else {
        return None;
    };

    // Rejects "inf", "NaN" and friends
    if !candidate.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
        return None;
    }

    candidate.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn is_number(value: &Value) -> bool {
    parse_number(value).is_some()
}

// =============================================================================
// DATE
// =============================================================================

/// Parse a date cell.
pub fn parse_date_value(value: &Value, options: ParseOptions) -> Option<chrono::NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) => parse_date(s, options.day_first),
        _ => None,
    }
}

pub fn is_date(value: &Value, options: ParseOptions) -> bool {
    parse_date_value(value, options).is_some()
}

// =============================================================================
// EMAIL / URL
// =============================================================================

pub fn is_email(value: &Value) -> bool {
    value.as_text().is_some_and(|s| EMAIL.is_match(s.trim()))
}

/// A URL with a web scheme, or any scheme with a host.
pub fn is_url(value: &Value) -> bool {
    let Some(s) = value.as_text().map(str::trim) else {
        return false;
    };
    if s.is_empty() || s.contains(char::is_whitespace) {
        return false;
    }
    match url::Url::parse(s) {
        Ok(url) => URL_SCHEMES.contains(&url.scheme()) || url.host().is_some(),
        Err(_) => false,
    }
}

// =============================================================================
// PHONE
// =============================================================================

/// International (`+…`) or national trunk (`0…`) phone number, 8 to 15 digits.
pub fn is_phone(value: &Value) -> bool {
    let Some(s) = value.as_text().map(str::trim) else {
        return false;
    };
    if !(s.starts_with('+') || s.starts_with('0')) {
        return false;
    }

    let body = s.strip_prefix('+').unwrap_or(s);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'))
    {
        return false;
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    (8..=15).contains(&digits)
}

// =============================================================================
// BOOLEAN
// =============================================================================

/// Parse a boolean-like cell.
pub fn parse_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) if *n == 1.0 => Some(true),
        Value::Number(n) if *n == 0.0 => Some(false),
        Value::Text(s) => {
            let lower = s.trim().to_lowercase();
            if TRUE_TOKENS.contains(&lower.as_str()) {
                Some(true)
            } else if FALSE_TOKENS.contains(&lower.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

pub fn is_boolean(value: &Value) -> bool {
    parse_boolean(value).is_some()
}

// =============================================================================
// IBAN
// =============================================================================

/// Shape check plus the ISO 13616 mod-97 checksum.
pub fn is_iban(value: &Value) -> bool {
    let Some(s) = value.as_text() else {
        return false;
    };
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    IBAN_SHAPE.is_match(&compact) && iban_checksum(&compact) == 1
}

/// Move the first four characters to the end, expand letters to 10..=35 and
/// reduce modulo 97 digit by digit.
fn iban_checksum(iban: &str) -> u32 {
    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    let mut remainder: u32 = 0;

    for c in rearranged {
        let n = match c.to_digit(36) {
            Some(n) => n,
            None => return 0,
        };
        remainder = if n >= 10 {
            (remainder * 100 + n) % 97
        } else {
            (remainder * 10 + n) % 97
        };
    }

    remainder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Value {
        Value::text(s)
    }

    #[test]
    fn test_number() {
        assert_eq!(parse_number(&t("42")), Some(42.0));
        assert_eq!(parse_number(&t(" -3.5 ")), Some(-3.5));
        assert_eq!(parse_number(&t("3,5")), Some(3.5));
        assert_eq!(parse_number(&t("0.25")), Some(0.25));
        assert_eq!(parse_number(&t("0")), Some(0.0));
        assert_eq!(parse_number(&t("1e3")), Some(1000.0));
        assert_eq!(parse_number(&Value::Number(7.0)), Some(7.0));

        assert_eq!(parse_number(&t("+33612345678")), None);
        assert_eq!(parse_number(&t("0612345678")), None);
        assert_eq!(parse_number(&t("1,000,000")), None);
        assert_eq!(parse_number(&t("1,5.2")), None);
        assert_eq!(parse_number(&t("inf")), None);
        assert_eq!(parse_number(&t("NaN")), None);
        assert_eq!(parse_number(&t("abc")), None);
        assert_eq!(parse_number(&Value::Bool(true)), None);
    }

    #[test]
    fn test_email() {
        assert!(is_email(&t("a@b.com")));
        assert!(is_email(&t(" A@B.com ")));
        assert!(!is_email(&t("a@b")));
        assert!(!is_email(&t("a b@c.com")));
        assert!(!is_email(&t("@b.com")));
    }

    #[test]
    fn test_url() {
        assert!(is_url(&t("https://example.com/path")));
        assert!(is_url(&t("ftp://files.example.org")));
        assert!(!is_url(&t("example.com")));
        assert!(!is_url(&t("mailto:a@b.com")));
        assert!(!is_url(&t("a@b.com")));
        assert!(!is_url(&t("http://exa mple.com")));
    }

    #[test]
    fn test_phone() {
        assert!(is_phone(&t("+33612345678")));
        assert!(is_phone(&t("0033612345678")));
        assert!(is_phone(&t("06 12 34 56 78")));
        assert!(is_phone(&t("+1 (555) 123-4567")));
        assert!(!is_phone(&t("12345678")));
        assert!(!is_phone(&t("0123")));
        assert!(!is_phone(&t("+33 6 12 ab")));
        assert!(!is_phone(&Value::Number(612345678.0)));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(parse_boolean(&t("Yes")), Some(true));
        assert_eq!(parse_boolean(&t("non")), Some(false));
        assert_eq!(parse_boolean(&t("0")), Some(false));
        assert_eq!(parse_boolean(&Value::Bool(true)), Some(true));
        assert_eq!(parse_boolean(&Value::Number(2.0)), None);
        assert_eq!(parse_boolean(&t("maybe")), None);
    }

    #[test]
    fn test_iban() {
        assert!(is_iban(&t("GB82 WEST 1234 5698 7654 32")));
        assert!(is_iban(&t("DE89370400440532013000")));
        assert!(is_iban(&t("fr1420041010050500013m02606")));
        assert!(!is_iban(&t("GB82WEST12345698765433")));
        assert!(!is_iban(&t("GB82")));
        assert!(!is_iban(&t("not an iban")));
    }

    #[test]
    fn test_rule_table_order() {
        let order: Vec<DetectedType> = TYPE_RULES.iter().map(|r| r.detected_type).collect();
        assert_eq!(
            order,
            vec![
                DetectedType::Number,
                DetectedType::Date,
                DetectedType::Email,
                DetectedType::Phone,
                DetectedType::Url,
                DetectedType::Boolean,
                DetectedType::Iban,
            ]
        );
        assert!(rule_for(DetectedType::Text).is_none());
    }

    #[test]
    fn test_validate_without_rule() {
        let opts = ParseOptions::default();
        assert!(validate(DetectedType::Text, &t("anything"), opts));
        assert!(validate(DetectedType::Email, &t("a@b.co"), opts));
        assert!(!validate(DetectedType::Email, &t("nope"), opts));
    }
}
