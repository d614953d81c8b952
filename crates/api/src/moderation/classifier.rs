//! Client for the external content-moderation classifier.
//!
//! The service scores a block of text per risk category; any score above
//! the fixed threshold rejects the text. Calls carry a bounded timeout.
//! A missing credential disables classification and counts as a pass,
//! leaving routing to the manual/hybrid flags alone.

use std::collections::HashMap;
use std::time::Duration;

use gigboard_core::moderation::{verdict_from_scores, ClassifierVerdict};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Classifier returned no results")]
    EmptyResponse,
}

pub struct ModerationClassifier {
    http: reqwest::Client,
    endpoint: String,
}

/// Response shape of the moderation endpoint.
#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    category_scores: HashMap<String, f64>,
}

impl ModerationClassifier {
    /// Build a client with the given endpoint and per-call timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction cannot fail with these options");
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Score `text` and reduce to a verdict.
    pub async fn moderate(
        &self,
        api_key: &str,
        text: &str,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        if api_key.is_empty() {
            tracing::debug!("Classifier credential not configured, passing text through");
            return Ok(ClassifierVerdict::Pass);
        }

        let body = json!({
            "model": "mistral-moderation-latest",
            "input": [text],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ModerationResponse = response.json().await?;
        let result = parsed
            .results
            .first()
            .ok_or(ClassifierError::EmptyResponse)?;

        Ok(verdict_from_scores(result.category_scores.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing_and_verdict() {
        let raw = r#"{
            "results": [
                { "category_scores": { "hate": 0.01, "violence": 0.02, "pii": 0.4 } }
            ]
        }"#;
        let parsed: ModerationResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            verdict_from_scores(parsed.results[0].category_scores.values()),
            ClassifierVerdict::Pass
        );

        let raw = r#"{
            "results": [
                { "category_scores": { "hate": 0.9, "violence": 0.02 } }
            ]
        }"#;
        let parsed: ModerationResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            verdict_from_scores(parsed.results[0].category_scores.values()),
            ClassifierVerdict::Fail
        );
    }

    #[tokio::test]
    async fn test_missing_credential_passes_without_network() {
        let classifier =
            ModerationClassifier::new("http://127.0.0.1:1/unreachable", Duration::from_secs(1));
        let verdict = classifier.moderate("", "any text").await.unwrap();
        assert_eq!(verdict, ClassifierVerdict::Pass);
    }
}
