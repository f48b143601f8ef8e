use serde::{Deserialize, Serialize};

/// Job-title group predicted from a user's skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleGroup(pub String);

impl std::fmt::Display for TitleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job title annotated with its suitability score (0 – 100) for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTitle {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Title_Group")]
    pub title_group: String,
    #[serde(rename = "Score")]
    pub score: u32,
}
