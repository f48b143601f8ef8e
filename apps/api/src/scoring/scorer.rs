//! Job scoring — pluggable, trait-based collaborator that turns survey answers
//! into a ranked list of job titles.
//!
//! Default: `KeywordJobScorer` (pure-Rust, deterministic, fully testable).
//! `AppState` holds an `Arc<dyn JobScorer>`, so another backend can be swapped
//! in at startup without touching the handlers.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::scoring::{ScoredTitle, TitleGroup};

// ────────────────────────────────────────────────────────────────────────────
// Document field names
// ────────────────────────────────────────────────────────────────────────────

const FIELD_TITLE: &str = "Title";
const FIELD_TITLE_GROUP: &str = "Title_Group";
const FIELD_KNOWLEDGE: &str = "Knowledge";
const FIELD_CATEGORY: &str = "Category";
const FIELD_LEVEL: &str = "Level";
const FIELD_SCORE: &str = "Score";
const FIELD_ALTERNATE_TITLE: &str = "Alternate_Title";

const CATEGORY_EDUCATION: &str = "Education";
const CATEGORY_EXPERIENCE: &str = "Experience";

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Alternate titles grouped under their primary title.
pub type AlternateTitles = BTreeMap<String, Vec<String>>;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait JobScorer: Send + Sync {
    /// Maps a user's skills onto the best-matching knowledge cluster.
    async fn predict_title_grouping(
        &self,
        knowledge_clusters: &[Value],
        skills: &[String],
    ) -> Result<TitleGroup, AppError>;

    /// Scores every occupation of `group` against the user's levels.
    async fn score_user(
        &self,
        work_level: &str,
        education_level: &str,
        group: &TitleGroup,
        education_experience: &[Value],
        occupations: &[Value],
    ) -> Result<Vec<ScoredTitle>, AppError>;

    /// Groups alternate titles by primary title, optionally restricted to a
    /// scored result.
    async fn show_alternate_titles(
        &self,
        alternate_titles: &[Value],
        scope: Option<&[ScoredTitle]>,
    ) -> Result<AlternateTitles, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordJobScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Keyword-overlap scorer.
///
/// Algorithm:
/// 1. Grouping: the `Title_Group` whose `Knowledge` values cover the most
///    distinct user skills wins (case-insensitive); ties go to the smallest name.
/// 2. Scoring: each occupation in the group gets the mean of its education and
///    experience scores for the user's levels, scaled to 0 – 100.
/// 3. Results sorted by score desc, then title asc, truncated to `max_results`.
pub struct KeywordJobScorer {
    pub max_results: usize,
}

impl Default for KeywordJobScorer {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[async_trait]
impl JobScorer for KeywordJobScorer {
    async fn predict_title_grouping(
        &self,
        knowledge_clusters: &[Value],
        skills: &[String],
    ) -> Result<TitleGroup, AppError> {
        compute_title_grouping(knowledge_clusters, skills)
    }

    async fn score_user(
        &self,
        work_level: &str,
        education_level: &str,
        group: &TitleGroup,
        education_experience: &[Value],
        occupations: &[Value],
    ) -> Result<Vec<ScoredTitle>, AppError> {
        let mut scored = compute_scores(
            work_level,
            education_level,
            group,
            education_experience,
            occupations,
        );
        scored.truncate(self.max_results);
        Ok(scored)
    }

    async fn show_alternate_titles(
        &self,
        alternate_titles: &[Value],
        scope: Option<&[ScoredTitle]>,
    ) -> Result<AlternateTitles, AppError> {
        Ok(group_alternate_titles(alternate_titles, scope))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithms
// ────────────────────────────────────────────────────────────────────────────

fn compute_title_grouping(clusters: &[Value], skills: &[String]) -> Result<TitleGroup, AppError> {
    let wanted: HashSet<String> = skills
        .iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
        .collect();

    let mut matched: BTreeMap<&str, HashSet<String>> = BTreeMap::new();
    for cluster in clusters {
        let Some(group) = text_field(cluster, FIELD_TITLE_GROUP) else {
            continue;
        };
        for knowledge in knowledge_values(cluster) {
            let knowledge = normalize(knowledge);
            if wanted.contains(&knowledge) {
                matched.entry(group).or_default().insert(knowledge);
            }
        }
    }

    // BTreeMap iterates in name order, so the first maximum is the tie winner.
    let mut best: Option<(&str, usize)> = None;
    for (group, hits) in &matched {
        if best.map_or(true, |(_, count)| hits.len() > count) {
            best = Some((*group, hits.len()));
        }
    }

    match best {
        Some((group, count)) => {
            tracing::debug!("Predicted title group '{group}' ({count} matching skills)");
            Ok(TitleGroup(group.to_string()))
        }
        None => Err(AppError::UnprocessableEntity(
            "None of the submitted skills match a known knowledge cluster".to_string(),
        )),
    }
}

fn compute_scores(
    work_level: &str,
    education_level: &str,
    group: &TitleGroup,
    education_experience: &[Value],
    occupations: &[Value],
) -> Vec<ScoredTitle> {
    let candidates: BTreeSet<&str> = occupations
        .iter()
        .filter(|o| text_field(o, FIELD_TITLE_GROUP) == Some(group.0.as_str()))
        .filter_map(|o| text_field(o, FIELD_TITLE))
        .collect();

    if candidates.is_empty() {
        tracing::warn!("No occupations found for title group '{group}'");
    }

    let mut scored: Vec<ScoredTitle> = candidates
        .into_iter()
        .map(|title| {
            let edu = level_score(education_experience, title, CATEGORY_EDUCATION, education_level);
            let exp = level_score(education_experience, title, CATEGORY_EXPERIENCE, work_level);
            ScoredTitle {
                title: title.to_string(),
                title_group: group.0.clone(),
                score: ((edu + exp) / 2.0 * 100.0).round() as u32,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.title.cmp(&b.title)));
    scored
}

/// Score (0.0 – 1.0) of the first row matching title, category and level.
fn level_score(rows: &[Value], title: &str, category: &str, level: &str) -> f64 {
    rows.iter()
        .find(|row| {
            text_field(row, FIELD_TITLE) == Some(title)
                && text_field(row, FIELD_CATEGORY).is_some_and(|c| c.eq_ignore_ascii_case(category))
                && text_field(row, FIELD_LEVEL).is_some_and(|l| normalize(l) == normalize(level))
        })
        .and_then(|row| number_field(row, FIELD_SCORE))
        .map(normalize_score)
        .unwrap_or(0.0)
}

/// Scores above 1 are treated as percentages.
fn normalize_score(score: f64) -> f64 {
    let score = if score > 1.0 { score / 100.0 } else { score };
    score.clamp(0.0, 1.0)
}

fn group_alternate_titles(rows: &[Value], scope: Option<&[ScoredTitle]>) -> AlternateTitles {
    let allowed: Option<HashSet<&str>> =
        scope.map(|titles| titles.iter().map(|t| t.title.as_str()).collect());

    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        let (Some(title), Some(alternate)) = (
            text_field(row, FIELD_TITLE),
            text_field(row, FIELD_ALTERNATE_TITLE),
        ) else {
            continue;
        };
        if allowed.as_ref().is_some_and(|a| !a.contains(title)) {
            continue;
        }
        grouped
            .entry(title.to_string())
            .or_default()
            .insert(alternate.to_string());
    }

    grouped
        .into_iter()
        .map(|(title, alternates)| (title, alternates.into_iter().collect()))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn text_field<'a>(document: &'a Value, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}

fn number_field(document: &Value, field: &str) -> Option<f64> {
    match document.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `Knowledge` may hold a single skill or a list of them.
fn knowledge_values(cluster: &Value) -> Vec<&str> {
    match cluster.get(FIELD_KNOWLEDGE) {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => vec![],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
