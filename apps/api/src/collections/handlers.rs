//! Axum route handlers for the collection dumps.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::collections::strip_internal_ids;
use crate::db::CollectionName;
use crate::errors::AppError;
use crate::salary::{convert_currency_fields, SALARY_2015, SALARY_2017};
use crate::state::AppState;

async fn dump(state: &AppState, collection: CollectionName) -> Result<Json<Vec<Value>>, AppError> {
    let documents = state.db.find_all(collection).await?;
    Ok(Json(strip_internal_ids(documents)))
}

/// GET /Education_Experience
pub async fn handle_education_experience(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    dump(&state, CollectionName::EducationExperience).await
}

/// GET /Alternate_Titles
pub async fn handle_alternate_titles(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    dump(&state, CollectionName::AlternateTitles).await
}

/// GET /Job_State_Salary
pub async fn handle_job_state_salary(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    dump(&state, CollectionName::JobStateSalary).await
}

/// GET /Knowledge_Cluster
pub async fn handle_knowledge_cluster(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    dump(&state, CollectionName::KnowledgeCluster).await
}

/// GET /Occupation
pub async fn handle_occupation(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    dump(&state, CollectionName::Occupation).await
}

/// GET /Salary_State_Year
///
/// Same as the other dumps, but `Salary_2015` and `Salary_2017` are returned
/// as numbers when they hold well-formed currency strings.
pub async fn handle_salary_state_year(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Json(mut documents) = dump(&state, CollectionName::SalaryStateYear).await?;
    for document in &mut documents {
        convert_currency_fields(document, &[SALARY_2015, SALARY_2017]);
    }
    Ok(Json(documents))
}
