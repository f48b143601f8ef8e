//! Currency parsing and the salary fallback policy shared by the dump and
//! chart routes.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::errors::AppError;

pub const SALARY_2015: &str = "Salary_2015";
pub const SALARY_2017: &str = "Salary_2017";
/// Aggregate row used when a title has no usable salary figures of its own.
pub const ALL_OCCUPATIONS: &str = "All Occupations";

#[derive(Debug, Error, PartialEq)]
pub enum CurrencyError {
    #[error("currency value is empty")]
    Empty,

    #[error("field '{0}' is missing")]
    Missing(String),

    #[error("currency value is neither text nor a number")]
    NotText,

    #[error("'{0}' is not a currency amount")]
    Invalid(String),
}

/// Parses strings such as `"$45,000"` or `"101,560.50"`.
pub fn parse_currency(raw: &str) -> Result<f64, CurrencyError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(CurrencyError::Empty);
    }

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(CurrencyError::Invalid(raw.to_string())),
    }
}

/// Like `parse_currency`, but also accepts values already stored as numbers.
pub fn currency_value(value: &Value) -> Result<f64, CurrencyError> {
    match value {
        Value::String(s) => parse_currency(s),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CurrencyError::Invalid(n.to_string())),
        _ => Err(CurrencyError::NotText),
    }
}

/// Replaces each present currency field with its numeric value.
/// Fields that fail to parse are left untouched.
pub fn convert_currency_fields(document: &mut Value, fields: &[&str]) {
    let Some(object) = document.as_object_mut() else {
        return;
    };
    for field in fields {
        let Some(value) = object.get_mut(*field) else {
            continue;
        };
        match currency_value(value) {
            Ok(amount) => {
                if let Some(number) = serde_json::Number::from_f64(amount) {
                    *value = Value::Number(number);
                }
            }
            Err(e) => tracing::debug!("Keeping {field} unconverted: {e}"),
        }
    }
}

/// A salary as emitted to charts: a number when parseable, else the stored
/// value with any `$` and `,` removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SalaryValue {
    Amount(f64),
    Raw(Value),
}

impl SalaryValue {
    pub fn from_stored(value: Option<&Value>) -> Self {
        match value {
            Some(v) => currency_value(v)
                .map(SalaryValue::Amount)
                .unwrap_or_else(|_| SalaryValue::Raw(strip_currency_marks(v))),
            None => SalaryValue::Raw(Value::Null),
        }
    }
}

fn strip_currency_marks(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.replace(['$', ','], "")),
        other => other.clone(),
    }
}

/// Reads every field in `fields` from `row`; any failure fails the whole row.
pub fn salary_figures(row: &Value, fields: &[&str]) -> Result<Vec<f64>, CurrencyError> {
    fields
        .iter()
        .map(|field| {
            row.get(*field)
                .ok_or_else(|| CurrencyError::Missing(field.to_string()))
                .and_then(currency_value)
        })
        .collect()
}

/// Salary figures for `title`: its own row when present and parseable,
/// otherwise the "All Occupations" row.
pub fn resolve_salaries(
    title: &str,
    row: Option<&Value>,
    all_occupations: Option<&Value>,
    fields: &[&str],
) -> Result<Vec<f64>, AppError> {
    if let Some(row) = row {
        match salary_figures(row, fields) {
            Ok(figures) => return Ok(figures),
            Err(e) => tracing::debug!("Salary row for '{title}' unusable ({e}), using {ALL_OCCUPATIONS}"),
        }
    } else {
        tracing::debug!("No salary row for '{title}', using {ALL_OCCUPATIONS}");
    }

    let fallback = all_occupations.ok_or_else(|| {
        AppError::NotFound(format!("No salary data for '{title}' or '{ALL_OCCUPATIONS}'"))
    })?;

    salary_figures(fallback, fields).map_err(|e| {
        AppError::NotFound(format!("'{ALL_OCCUPATIONS}' salary row is unusable: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_currency_well_formed() {
        assert_eq!(parse_currency("$45,000"), Ok(45000.0));
        assert_eq!(parse_currency(" $1,234,567.50 "), Ok(1234567.5));
        assert_eq!(parse_currency("38000"), Ok(38000.0));
    }

    #[test]
    fn test_parse_currency_malformed() {
        assert_eq!(parse_currency(""), Err(CurrencyError::Empty));
        assert_eq!(parse_currency("$"), Err(CurrencyError::Empty));
        assert_eq!(
            parse_currency("N/A"),
            Err(CurrencyError::Invalid("N/A".to_string()))
        );
        assert!(parse_currency("NaN").is_err());
        assert!(parse_currency("inf").is_err());
    }

    #[test]
    fn test_currency_value_accepts_numbers() {
        assert_eq!(currency_value(&json!(52000)), Ok(52000.0));
        assert_eq!(currency_value(&json!(null)), Err(CurrencyError::NotText));
    }

    #[test]
    fn test_convert_fields_independently() {
        let mut doc = json!({
            "Job_Title": "Actuaries",
            "Salary_2015": "$45,000",
            "Salary_2017": "*"
        });
        convert_currency_fields(&mut doc, &[SALARY_2015, SALARY_2017]);
        assert_eq!(doc["Salary_2015"], json!(45000.0));
        assert_eq!(doc["Salary_2017"], json!("*"));
        assert_eq!(doc["Job_Title"], json!("Actuaries"));
    }

    #[test]
    fn test_convert_ignores_missing_fields() {
        let mut doc = json!({"Job_Title": "Actuaries"});
        convert_currency_fields(&mut doc, &[SALARY_2015]);
        assert_eq!(doc, json!({"Job_Title": "Actuaries"}));
    }

    #[test]
    fn test_salary_value_passes_malformed_through() {
        assert_eq!(
            SalaryValue::from_stored(Some(&json!("$70,100"))),
            SalaryValue::Amount(70100.0)
        );
        assert_eq!(
            SalaryValue::from_stored(Some(&json!("#"))),
            SalaryValue::Raw(json!("#"))
        );
        assert_eq!(
            SalaryValue::from_stored(Some(&json!("$n/a,"))),
            SalaryValue::Raw(json!("n/a"))
        );
        assert_eq!(
            SalaryValue::from_stored(Some(&json!(true))),
            SalaryValue::Raw(json!(true))
        );
        assert_eq!(serde_json::to_string(&SalaryValue::Amount(1.5)).unwrap(), "1.5");
    }

    #[test]
    fn test_resolve_prefers_own_row() {
        let row = json!({"Salary_2015": "$10", "Salary_2017": "$20"});
        let all = json!({"Salary_2015": "$1", "Salary_2017": "$2"});
        let figures =
            resolve_salaries("T", Some(&row), Some(&all), &[SALARY_2015, SALARY_2017]).unwrap();
        assert_eq!(figures, vec![10.0, 20.0]);
    }

    #[test]
    fn test_resolve_falls_back_on_missing_or_bad_row() {
        let all = json!({"Salary_2015": "$1", "Salary_2017": "$2"});
        let fields = [SALARY_2015, SALARY_2017];

        let missing = resolve_salaries("T", None, Some(&all), &fields).unwrap();
        assert_eq!(missing, vec![1.0, 2.0]);

        let partial = json!({"Salary_2015": "$10", "Salary_2017": "n/a"});
        let bad = resolve_salaries("T", Some(&partial), Some(&all), &fields).unwrap();
        assert_eq!(bad, vec![1.0, 2.0]);
    }

    #[test]
    fn test_resolve_without_fallback_is_not_found() {
        let err = resolve_salaries("T", None, None, &[SALARY_2017]).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
