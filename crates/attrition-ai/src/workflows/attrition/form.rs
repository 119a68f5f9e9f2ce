use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::profile::{EmployeeProfile, FieldValue};

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("field entry '{0}' must look like Key=Value")]
    MalformedPair(String),
    #[error("unable to open profile CSV '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read profile CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Turns a raw form string into a number when it starts with a decimal literal.
///
/// Mirrors float-prefix parsing: leading whitespace is skipped and trailing
/// garbage ignored, so `"12 km"` becomes `12`. Anything without a finite numeric
/// prefix, including the empty string, is kept verbatim.
pub fn coerce(raw: &str) -> FieldValue {
    match numeric_prefix(raw) {
        Some(value) => FieldValue::Number(value),
        None => FieldValue::Text(raw.to_string()),
    }
}

fn numeric_prefix(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Builds a profile from raw key/value entries, coercing every value.
pub fn collect<I, K, V>(entries: I) -> EmployeeProfile
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    let mut profile = EmployeeProfile::new();
    for (key, value) in entries {
        profile.insert(key, coerce(value.as_ref()));
    }
    profile
}

/// Splits a `Key=Value` entry. The value may be empty; the key may not.
pub fn parse_pair(raw: &str) -> Result<(String, String), FormError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(FormError::MalformedPair(raw.to_string())),
    }
}

pub fn collect_pairs<S: AsRef<str>>(entries: &[S]) -> Result<EmployeeProfile, FormError> {
    let pairs = entries
        .iter()
        .map(|entry| parse_pair(entry.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collect(pairs))
}

/// Reads one profile per CSV row; the header row names the fields.
pub fn profiles_from_csv<R: Read>(reader: R) -> Result<Vec<EmployeeProfile>, FormError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut profiles = Vec::new();
    for record in reader.records() {
        let record = record?;
        profiles.push(collect(headers.iter().zip(record.iter())));
    }
    Ok(profiles)
}

pub fn profiles_from_csv_path(path: impl AsRef<Path>) -> Result<Vec<EmployeeProfile>, FormError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FormError::Open {
        path: path.display().to_string(),
        source,
    })?;
    profiles_from_csv(file)
}
