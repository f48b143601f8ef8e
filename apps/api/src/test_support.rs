//! Router fixtures shared by handler tests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::memory::MemoryDocumentStore;
use crate::db::CollectionName;
use crate::results::FileResultStore;
use crate::routes::build_router;
use crate::scoring::scorer::KeywordJobScorer;
use crate::state::AppState;

pub struct TestApp {
    pub state: AppState,
    pub db: Arc<MemoryDocumentStore>,
    _dir: TempDir,
}

impl TestApp {
    pub fn new(store: MemoryDocumentStore) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_tests(dir.path().to_path_buf());
        let db = Arc::new(store);
        let state = AppState {
            db: db.clone(),
            results: Arc::new(FileResultStore::new(
                config.results_dir.clone(),
                config.result_ttl_secs,
            )),
            scorer: Arc::new(KeywordJobScorer::default()),
            config,
        };
        Self {
            state,
            db,
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn results_dir(&self) -> PathBuf {
        self.state.config.results_dir.clone()
    }
}

/// Reference collections where the skill "x" maps to the "Data" group and an
/// Entry/Bachelor submission scores Data Scientists 85 and Statisticians 60.
/// Statisticians has no `Salary_State_Year` row, so charts fall back to
/// "All Occupations" for it.
pub fn reference_store() -> MemoryDocumentStore {
    MemoryDocumentStore::default()
        .with(
            CollectionName::KnowledgeCluster,
            vec![
                json!({"_id": 1, "Title_Group": "Data", "Knowledge": ["x", "Statistics"]}),
                json!({"_id": 2, "Title_Group": "Health", "Knowledge": "Biology"}),
            ],
        )
        .with(
            CollectionName::Occupation,
            vec![
                json!({"_id": 1, "Title": "Data Scientists", "Title_Group": "Data"}),
                json!({"_id": 2, "Title": "Statisticians", "Title_Group": "Data"}),
                json!({"_id": 3, "Title": "Nurses", "Title_Group": "Health"}),
            ],
        )
        .with(
            CollectionName::EducationExperience,
            vec![
                json!({"Title": "Data Scientists", "Category": "Education", "Level": "Bachelor", "Score": 0.9}),
                json!({"Title": "Data Scientists", "Category": "Experience", "Level": "Entry", "Score": 0.8}),
                json!({"Title": "Statisticians", "Category": "Education", "Level": "Bachelor", "Score": 70}),
                json!({"Title": "Statisticians", "Category": "Experience", "Level": "Entry", "Score": "50"}),
            ],
        )
        .with(
            CollectionName::AlternateTitles,
            vec![
                json!({"_id": 1, "Title": "Data Scientists", "Alternate_Title": "Machine Learning Engineer"}),
                json!({"_id": 2, "Title": "Statisticians", "Alternate_Title": "Data Analyst"}),
                json!({"_id": 3, "Title": "Statisticians", "Alternate_Title": "Biostatistician"}),
                json!({"_id": 4, "Title": "Nurses", "Alternate_Title": "RN"}),
            ],
        )
        .with(
            CollectionName::SalaryStateYear,
            vec![
                json!({"_id": 1, "Job_Title": "Data Scientists", "Salary_2015": "$35,000", "Salary_2017": "$40,000"}),
                json!({"_id": 2, "Job_Title": "Nurses", "Salary_2015": "$65,000", "Salary_2017": "$70,000"}),
                json!({"_id": 3, "Job_Title": "All Occupations", "Salary_2015": "$48,320", "Salary_2017": "$50,620"}),
            ],
        )
        .with(
            CollectionName::JobStateSalary,
            vec![
                json!({"_id": 1, "Job_Title": "Data Scientists", "State": "CA", "Salary": "$120,000"}),
                json!({"_id": 2, "Job_Title": "Data Scientists", "State": "NY", "Salary": "$110,500"}),
                json!({"_id": 3, "Job_Title": "Statisticians", "State": "TX", "Salary": "*"}),
                json!({"_id": 4, "Job_Title": "Nurses", "State": "OH", "Salary": "$61,000"}),
            ],
        )
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn get_request(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

fn parse_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

pub async fn get_json(router: &Router, path: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(router, get_request(path)).await;
    (status, parse_json(&body))
}

pub async fn get_raw(router: &Router, path: &str) -> Vec<u8> {
    send(router, get_request(path)).await.2
}

pub async fn get_raw_with_status(router: &Router, path: &str) -> (StatusCode, Vec<u8>) {
    let (status, _, body) = send(router, get_request(path)).await;
    (status, body)
}

pub async fn post_form(
    router: &Router,
    path: &str,
    fields: &[(&str, &str)],
) -> (StatusCode, HeaderMap, Value) {
    let encoded = serde_urlencoded::to_string(fields).unwrap();

    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encoded))
        .unwrap();

    let (status, headers, body) = send(router, request).await;
    (status, headers, parse_json(&body))
}
