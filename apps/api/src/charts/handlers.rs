//! Axum route handlers for the result and chart API.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Query, State},
    Json,
};

use crate::charts::builders::{
    build_bar_chart, build_line_chart, build_map_chart, BarChart, LineSeries, SalaryRows,
    StateSalary,
};
use crate::collections::{strip_internal_id, strip_internal_ids};
use crate::db::CollectionName;
use crate::errors::AppError;
use crate::models::scoring::ScoredTitle;
use crate::results::{load_results, SubmissionQuery};
use crate::salary::ALL_OCCUPATIONS;
use crate::state::AppState;

const JOB_TITLE: &str = "Job_Title";

async fn fetch_salary_rows(
    state: &AppState,
    results: &[ScoredTitle],
) -> Result<SalaryRows, AppError> {
    let mut rows = SalaryRows::default();
    for scored in results {
        if rows.by_title.contains_key(&scored.title) {
            continue;
        }
        if let Some(row) = state
            .db
            .find_one_by_field(CollectionName::SalaryStateYear, JOB_TITLE, &scored.title)
            .await?
        {
            rows.by_title
                .insert(scored.title.clone(), strip_internal_id(row));
        }
    }
    rows.all_occupations = state
        .db
        .find_one_by_field(CollectionName::SalaryStateYear, JOB_TITLE, ALL_OCCUPATIONS)
        .await?
        .map(strip_internal_id);
    Ok(rows)
}

/// GET /result_output
pub async fn handle_result_output(
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<Vec<ScoredTitle>>, AppError> {
    let results = load_results(state.results.as_ref(), query.id()?).await?;
    Ok(Json(results))
}

/// GET /results_bar_plot
pub async fn handle_bar_plot(
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<BarChart>, AppError> {
    let results = load_results(state.results.as_ref(), query.id()?).await?;
    let rows = fetch_salary_rows(&state, &results).await?;
    Ok(Json(build_bar_chart(&results, &rows)?))
}

/// GET /results_line_plot
pub async fn handle_line_plot(
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<BTreeMap<String, LineSeries>>, AppError> {
    let results = load_results(state.results.as_ref(), query.id()?).await?;
    let rows = fetch_salary_rows(&state, &results).await?;
    Ok(Json(build_line_chart(&results, &rows)?))
}

/// GET /results_map_plot
pub async fn handle_map_plot(
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<BTreeMap<String, Vec<StateSalary>>>, AppError> {
    let results = load_results(state.results.as_ref(), query.id()?).await?;

    let mut state_rows = HashMap::new();
    for scored in &results {
        if state_rows.contains_key(&scored.title) {
            continue;
        }
        let rows = state
            .db
            .find_by_field(CollectionName::JobStateSalary, JOB_TITLE, &scored.title)
            .await?;
        state_rows.insert(scored.title.clone(), strip_internal_ids(rows));
    }

    Ok(Json(build_map_chart(&results, &state_rows)))
}
