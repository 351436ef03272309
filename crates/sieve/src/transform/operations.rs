//! Value normalizers and imputation statistics.
//!
//! Normalizers return `None` when a value cannot be rewritten; callers leave
//! such values untouched. Every normalizer is idempotent.

use indexmap::IndexMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::input::Value;
use crate::inference::recognizers::{parse_date_value, parse_number, rule_for, ParseOptions};
use crate::suggestion::StandardizeKind;

/// Trim and lowercase an email address.
pub fn standardize_email(value: &Value) -> Option<Value> {
    let s = value.as_text()?;
    Some(Value::Text(s.trim().to_lowercase()))
}

/// Parse into a calendar date.
pub fn standardize_date(value: &Value, options: ParseOptions) -> Option<Value> {
    parse_date_value(value, options).map(Value::Date)
}

/// Rewrite a phone number as `+` followed by digits.
///
/// A leading `00` international prefix becomes `+`. Values without digits
/// are left alone.
pub fn standardize_phone(value: &Value) -> Option<Value> {
    let raw = match value {
        Value::Text(s) => s.trim().to_string(),
        Value::Number(_) => value.to_string(),
        _ => return None,
    };

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let national = if raw.starts_with('+') {
        digits.as_str()
    } else {
        digits.strip_prefix("00").unwrap_or(&digits)
    };

    Some(Value::Text(format!("+{}", national)))
}

/// Remove whitespace and uppercase an IBAN.
pub fn standardize_iban(value: &Value) -> Option<Value> {
    let s = value.as_text()?;
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    Some(Value::Text(compact))
}

/// Strip diacritics and surrounding whitespace.
pub fn normalize_text(value: &Value) -> Option<Value> {
    let s = value.as_text()?;
    let stripped: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect();
    Some(Value::Text(stripped.trim().to_string()))
}

/// Apply the standardization for `kind`, looked up in the type rule table.
pub fn standardize(kind: StandardizeKind, value: &Value, options: ParseOptions) -> Option<Value> {
    rule_for(kind.detected_type())
        .and_then(|rule| rule.normalizer)
        .and_then(|normalize| normalize(value, options))
}

/// Mean of the numeric non-blank values, if there are any.
pub fn column_mean(values: &[Value]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for n in values.iter().filter(|v| !v.is_blank()).filter_map(parse_number) {
        sum += n;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Most frequent non-blank value; ties go to the value seen first.
pub fn column_mode(values: &[Value]) -> Option<Value> {
    let mut counts: IndexMap<String, (usize, &Value)> = IndexMap::new();
    for value in values {
        if let Some(key) = value.key() {
            counts.entry(key).or_insert((0, value)).0 += 1;
        }
    }

    let mut best: Option<(usize, &Value)> = None;
    for &(count, value) in counts.values() {
        if best.is_none_or(|(top, _)| count > top) {
            best = Some((count, value));
        }
    }
    best.map(|(_, v)| v.clone())
}
