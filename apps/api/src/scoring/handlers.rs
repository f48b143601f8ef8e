//! Axum route handlers for the scoring API.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::collections::strip_internal_ids;
use crate::db::CollectionName;
use crate::errors::AppError;
use crate::models::submission::UserSubmission;
use crate::results::{load_results, SubmissionQuery};
use crate::scoring::scorer::AlternateTitles;
use crate::state::AppState;

/// Response header carrying the id that scopes later chart requests.
pub const SUBMISSION_ID_HEADER: &str = "x-submission-id";

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub data: Option<String>,
}

/// POST /Predict_Score_Users
///
/// Full pipeline: validate → persist submission → title grouping → scoring →
/// store result. Returns the scored titles exactly as stored.
pub async fn handle_predict_score_users(
    State(state): State<AppState>,
    Form(form): Form<PredictForm>,
) -> Result<impl IntoResponse, AppError> {
    let raw = form
        .data
        .ok_or_else(|| AppError::Validation("form field 'data' is required".to_string()))?;
    let submission = UserSubmission::parse(&raw)?;

    let submission_id = Uuid::new_v4();
    info!(
        "Scoring submission {submission_id} ({} skills)",
        submission.skills.len()
    );

    state
        .db
        .insert(
            CollectionName::UserData,
            submission.to_document(submission_id, Utc::now())?,
        )
        .await?;

    let knowledge_clusters =
        strip_internal_ids(state.db.find_all(CollectionName::KnowledgeCluster).await?);
    let group = state
        .scorer
        .predict_title_grouping(&knowledge_clusters, &submission.skills)
        .await?;

    let education_experience =
        strip_internal_ids(state.db.find_all(CollectionName::EducationExperience).await?);
    let occupations = strip_internal_ids(state.db.find_all(CollectionName::Occupation).await?);

    let scored_titles = state
        .scorer
        .score_user(
            &submission.work_experience_level,
            &submission.education_level,
            &group,
            &education_experience,
            &occupations,
        )
        .await?;

    state.results.put(submission_id, &scored_titles).await?;

    Ok((
        [(SUBMISSION_ID_HEADER, submission_id.to_string())],
        Json(scored_titles),
    ))
}

/// GET /Alternate_Titles_User
///
/// Alternate titles grouped by primary title, limited to the titles of the
/// requested (or latest) scored result when one exists.
pub async fn handle_alternate_titles_user(
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<AlternateTitles>, AppError> {
    let alternate_titles =
        strip_internal_ids(state.db.find_all(CollectionName::AlternateTitles).await?);

    let scope = match query.id()? {
        Some(id) => Some(load_results(state.results.as_ref(), Some(id)).await?),
        None => state.results.latest().await?,
    };

    let grouped = state
        .scorer
        .show_alternate_titles(&alternate_titles, scope.as_deref())
        .await?;
    Ok(Json(grouped))
}
