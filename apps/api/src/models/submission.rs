use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;

/// Keys the server writes itself or that MongoDB treats specially.
const RESERVED_KEYS: [&str; 3] = ["_id", "submission_id", "submitted_at"];

/// Survey answers posted by the front end in the `data` form field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSubmission {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Skills")]
    pub skills: Vec<String>,
    #[serde(rename = "Work Experience Level")]
    pub work_experience_level: String,
    #[serde(rename = "Education Level")]
    pub education_level: String,
    /// Any other keys the client sent; stored alongside the known ones.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSubmission {
    /// Parses and validates the raw `data` payload.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::Validation("data cannot be empty".to_string()));
        }

        let mut submission: UserSubmission = serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("data is not a valid submission: {e}")))?;

        submission.normalize();
        submission.validate()?;
        Ok(submission)
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.work_experience_level = self.work_experience_level.trim().to_string();
        self.education_level = self.education_level.trim().to_string();
        self.skills = self
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        if self.skills.is_empty() {
            return Err(AppError::Validation(
                "Skills must list at least one skill".to_string(),
            ));
        }
        if self.work_experience_level.is_empty() {
            return Err(AppError::Validation(
                "Work Experience Level cannot be empty".to_string(),
            ));
        }
        if self.education_level.is_empty() {
            return Err(AppError::Validation(
                "Education Level cannot be empty".to_string(),
            ));
        }
        if let Some(key) = self
            .extra
            .keys()
            .find(|key| RESERVED_KEYS.contains(&key.as_str()) || key.starts_with('$'))
        {
            return Err(AppError::Validation(format!(
                "'{key}' is a reserved key and cannot be submitted"
            )));
        }
        Ok(())
    }

    /// The document persisted to `user_data`.
    pub fn to_document(
        &self,
        submission_id: Uuid,
        submitted_at: DateTime<Utc>,
    ) -> Result<Value, AppError> {
        let mut document = serde_json::to_value(self)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("submission serialization: {e}")))?;

        if let Some(fields) = document.as_object_mut() {
            fields.insert(
                "submission_id".to_string(),
                Value::String(submission_id.to_string()),
            );
            fields.insert(
                "submitted_at".to_string(),
                Value::String(submitted_at.to_rfc3339()),
            );
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"Name": "A", "Skills": ["x"], "Work Experience Level": "Entry", "Education Level": "Bachelor"}"#;

    #[test]
    fn test_parses_valid_submission() {
        let submission = UserSubmission::parse(VALID).unwrap();
        assert_eq!(submission.name, "A");
        assert_eq!(submission.skills, vec!["x".to_string()]);
        assert_eq!(submission.work_experience_level, "Entry");
        assert_eq!(submission.education_level, "Bachelor");
        assert!(submission.extra.is_empty());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = UserSubmission::parse("{'Name': 'A'").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rejects_missing_key() {
        let err = UserSubmission::parse(r#"{"Name": "A", "Skills": ["x"]}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rejects_blank_skills() {
        let raw = r#"{"Name": "A", "Skills": ["  ", ""], "Work Experience Level": "Entry", "Education Level": "Bachelor"}"#;
        let err = UserSubmission::parse(raw).unwrap_err();
        assert!(err.to_string().contains("Skills"));
    }

    #[test]
    fn test_rejects_empty_payload() {
        assert!(matches!(
            UserSubmission::parse("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_extra_fields_are_kept_in_document() {
        let raw = r#"{"Name": " A ", "Skills": ["x"], "Work Experience Level": "Entry", "Education Level": "Bachelor", "Phone": "555"}"#;
        let submission = UserSubmission::parse(raw).unwrap();
        let id = Uuid::new_v4();
        let document = submission.to_document(id, Utc::now()).unwrap();

        assert_eq!(document["Name"], "A");
        assert_eq!(document["Phone"], "555");
        assert_eq!(document["submission_id"], id.to_string());
        assert!(document["submitted_at"].is_string());
    }

    #[test]
    fn test_rejects_reserved_and_operator_keys() {
        for key in ["_id", "submission_id", "submitted_at", "$where"] {
            let raw = format!(
                r#"{{"Name": "A", "Skills": ["x"], "Work Experience Level": "Entry", "Education Level": "Bachelor", "{key}": "x"}}"#
            );
            let err = UserSubmission::parse(&raw).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{key} accepted");
            assert!(err.to_string().contains(key));
        }
    }
}
