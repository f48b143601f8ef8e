//! Pure chart builders. Handlers fetch the rows; everything here is a
//! deterministic function of the scored result and those rows.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::scoring::ScoredTitle;
use crate::salary::{resolve_salaries, SalaryValue, SALARY_2015, SALARY_2017};

pub const LINE_YEARS: [&str; 2] = ["2015", "2017"];

/// `Salary_State_Year` rows needed to chart one result.
#[derive(Debug, Default)]
pub struct SalaryRows {
    pub by_title: HashMap<String, Value>,
    pub all_occupations: Option<Value>,
}

impl SalaryRows {
    fn resolve(&self, title: &str, fields: &[&str]) -> Result<Vec<f64>, AppError> {
        resolve_salaries(
            title,
            self.by_title.get(title),
            self.all_occupations.as_ref(),
            fields,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    #[serde(rename = "Title")]
    pub title: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSalary {
    #[serde(rename = "State")]
    pub state: Value,
    #[serde(rename = "Salary")]
    pub salary: SalaryValue,
    #[serde(rename = "Title")]
    pub title: String,
}

/// 2017 salary per scored title, sorted by salary descending.
/// Equal salaries keep their order in the result.
pub fn build_bar_chart(results: &[ScoredTitle], rows: &SalaryRows) -> Result<BarChart, AppError> {
    let mut bars = Vec::with_capacity(results.len());
    for scored in results {
        let figures = rows.resolve(&scored.title, &[SALARY_2017])?;
        bars.push((scored.title.clone(), figures[0]));
    }

    bars.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (x, y) = bars.into_iter().unzip();
    Ok(BarChart { x, y })
}

/// 2015 and 2017 salaries per scored title.
pub fn build_line_chart(
    results: &[ScoredTitle],
    rows: &SalaryRows,
) -> Result<BTreeMap<String, LineSeries>, AppError> {
    let mut series = BTreeMap::new();
    for scored in results {
        let y = rows.resolve(&scored.title, &[SALARY_2015, SALARY_2017])?;
        series.insert(
            scored.title.clone(),
            LineSeries {
                title: scored.title.clone(),
                x: LINE_YEARS.iter().map(|s| s.to_string()).collect(),
                y,
            },
        );
    }
    Ok(series)
}

/// Per-state salaries for each scored title; titles without state rows map
/// to an empty list.
pub fn build_map_chart(
    results: &[ScoredTitle],
    state_rows: &HashMap<String, Vec<Value>>,
) -> BTreeMap<String, Vec<StateSalary>> {
    results
        .iter()
        .map(|scored| {
            let entries = state_rows
                .get(&scored.title)
                .map(|rows| {
                    rows.iter()
                        .map(|row| StateSalary {
                            state: row.get("State").cloned().unwrap_or(Value::Null),
                            salary: SalaryValue::from_stored(row.get("Salary")),
                            title: scored.title.clone(),
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            (scored.title.clone(), entries)
        })
        .collect()
}
