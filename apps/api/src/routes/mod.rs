pub mod health;
pub mod pages;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::charts::handlers as charts;
use crate::collections::handlers as collections;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::handle_landing))
        .route("/index", get(pages::handle_landing))
        .route("/survey", get(pages::handle_survey))
        .route("/result", get(pages::handle_result))
        .route("/trends", get(pages::handle_trends))
        .route("/about", get(pages::handle_about))
        .route("/data", get(pages::handle_data_search))
        // Collection dumps
        .route(
            "/Education_Experience",
            get(collections::handle_education_experience),
        )
        .route("/Alternate_Titles", get(collections::handle_alternate_titles))
        .route("/Job_State_Salary", get(collections::handle_job_state_salary))
        .route("/Knowledge_Cluster", get(collections::handle_knowledge_cluster))
        .route("/Salary_State_Year", get(collections::handle_salary_state_year))
        .route("/Occupation", get(collections::handle_occupation))
        // Scoring
        .route(
            "/Predict_Score_Users",
            post(scoring::handle_predict_score_users),
        )
        .route(
            "/Alternate_Titles_User",
            get(scoring::handle_alternate_titles_user),
        )
        // Results and charts
        .route("/result_output", get(charts::handle_result_output))
        .route("/results_bar_plot", get(charts::handle_bar_plot))
        .route("/results_map_plot", get(charts::handle_map_plot))
        .route("/results_line_plot", get(charts::handle_line_plot))
        .nest_service("/static", static_files)
        .with_state(state)
}
