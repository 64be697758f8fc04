use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::prompt::{messages_for, ChatMessage};
use crate::backend::{BackendHealth, BackendKind, IdentificationBackend};
use crate::category::Category;
use crate::config::ResolverConfig;
use crate::error::{BackendFailure, IdentifyError};
use crate::request::IdentificationRequest;
use crate::result::IdentificationResult;

/// Hosted completion service whose reply text embeds a JSON verdict.
pub struct RemoteGenerativeBackend {
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    completion: Option<String>,
}

/// The JSON object the model is asked to write.
///
/// `material`, `barcode` and `commonVariations` are requested by some
/// prompts; like any other extra field they are ignored.
#[derive(Debug, Deserialize)]
struct Verdict {
    item: Option<String>,
    category: Option<String>,
    recyclable: Option<bool>,
}

impl RemoteGenerativeBackend {
    pub fn new() -> Result<Self, IdentifyError> {
        Ok(Self::with_client(reqwest::Client::builder().build()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentificationBackend for RemoteGenerativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteAi
    }

    fn supports(&self, _request: &IdentificationRequest) -> bool {
        true
    }

    async fn query(
        &self,
        request: &IdentificationRequest,
        config: &ResolverConfig,
    ) -> Result<IdentificationResult, BackendFailure> {
        let url = config.remote_endpoint.as_str();
        tracing::debug!(endpoint = %url, kind = ?request.kind(), "requesting completion");
        let response = self
            .client
            .post(url)
            .timeout(config.request_timeout())
            .json(&CompletionRequest {
                messages: messages_for(request),
            })
            .send()
            .await
            .map_err(|error| BackendFailure::from_reqwest(url, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendFailure::Protocol {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| BackendFailure::from_reqwest(url, error))?;
        let completion: CompletionResponse = serde_json::from_slice(&body)
            .map_err(|error| BackendFailure::Malformed(format!("completion body: {error}")))?;
        let text = completion
            .completion
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| BackendFailure::Malformed("empty completion".to_string()))?;
        parse_verdict(&text)
    }

    async fn health(&self, config: &ResolverConfig) -> BackendHealth {
        // The hosted service has no health route; it is assumed reachable.
        BackendHealth {
            available: true,
            endpoint: config.remote_endpoint.clone(),
        }
    }
}

fn parse_verdict(completion: &str) -> Result<IdentificationResult, BackendFailure> {
    let verdict: Verdict = serde_json::from_str(strip_code_fence(completion)).map_err(|error| {
        tracing::debug!(completion_len = completion.len(), "unparseable completion");
        BackendFailure::Malformed(format!("completion is not the expected JSON: {error}"))
    })?;

    let item = verdict
        .item
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .ok_or_else(|| BackendFailure::Malformed("verdict missing item".to_string()))?;
    let category = verdict
        .category
        .filter(|category| !category.trim().is_empty())
        .ok_or_else(|| BackendFailure::Malformed("verdict missing category".to_string()))?;
    let recyclable = verdict
        .recyclable
        .ok_or_else(|| BackendFailure::Malformed("verdict missing recyclable".to_string()))?;

    Ok(IdentificationResult::classified(
        item,
        Category::coerce(&category),
        recyclable,
    ))
}

/// Models sometimes wrap JSON in a Markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::{config_with_remote, refused_endpoint, MockEndpoint, MockReply, PIXEL};
    use serde_json::json;

    #[test]
    fn parses_plain_and_fenced_verdicts() {
        let plain = parse_verdict(r#"{"item":"Glass Jar","category":"glass","recyclable":true}"#)
            .unwrap();
        assert_eq!(plain.item, "Glass Jar");
        assert_eq!(plain.category, Category::Glass);

        let fenced = parse_verdict(
            "```json\n{\"item\":\"Glass Jar\",\"category\":\"glass\",\"recyclable\":true}\n```",
        )
        .unwrap();
        assert_eq!(fenced, plain);
    }

    #[test]
    fn accepts_optional_extra_fields() {
        let result = parse_verdict(
            r#"{"item":"Water Bottle","category":"plastic","material":"PET","recyclable":true,
                "barcode":"0123456789","commonVariations":["soda bottle"]}"#,
        )
        .unwrap();
        assert_eq!(result.category, Category::Plastic);
        assert_eq!(result.instructions, catalog::guide(Category::Plastic).recyclable);
    }

    #[test]
    fn rejects_missing_or_mistyped_fields() {
        let cases = [
            "this is not json",
            r#"{"category":"glass","recyclable":true}"#,
            r#"{"item":"  ","category":"glass","recyclable":true}"#,
            r#"{"item":"Jar","recyclable":true}"#,
            r#"{"item":"Jar","category":"glass","recyclable":"true"}"#,
            r#"{"item":"Jar","category":"glass"}"#,
        ];
        for case in cases {
            assert!(
                matches!(parse_verdict(case), Err(BackendFailure::Malformed(_))),
                "expected malformed for {case}"
            );
        }
    }

    #[test]
    fn unknown_category_becomes_mixed() {
        let result =
            parse_verdict(r#"{"item":"Ore","category":"unobtainium","recyclable":false}"#).unwrap();
        assert_eq!(result.category, Category::Mixed);
        assert_eq!(result.instructions, catalog::guide(Category::Mixed).non_recyclable);
    }

    #[tokio::test]
    async fn posts_messages_and_reads_embedded_json() {
        let endpoint = MockEndpoint::start(vec![MockReply::completion(
            r#"{"item":"Banana Peel","category":"organic","recyclable":false}"#,
        )])
        .await;
        let backend = RemoteGenerativeBackend::new().unwrap();
        let config = config_with_remote(endpoint.base_url());
        let request = IdentificationRequest::image(PIXEL).unwrap();

        let result = backend.query(&request, &config).await.unwrap();
        assert_eq!(result.item, "Banana Peel");
        assert_eq!(result.category, Category::Organic);
        assert!(!result.recyclable);

        let bodies = endpoint.bodies();
        let body = &bodies[0];
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][1]["content"][1]["image"], PIXEL);
    }

    #[tokio::test]
    async fn non_success_status_is_protocol_failure() {
        let endpoint = MockEndpoint::start(vec![MockReply::json(429, json!({"error": "slow down"}))]).await;
        let backend = RemoteGenerativeBackend::new().unwrap();
        let config = config_with_remote(endpoint.base_url());
        let request = IdentificationRequest::text("pizza box").unwrap();

        let failure = backend.query(&request, &config).await.unwrap_err();
        assert_eq!(failure, BackendFailure::Protocol { status: 429 });
        assert_eq!(endpoint.hits(), 1);
    }

    #[tokio::test]
    async fn missing_completion_is_malformed() {
        let endpoint = MockEndpoint::start(vec![MockReply::json(200, json!({"text": "hi"}))]).await;
        let backend = RemoteGenerativeBackend::new().unwrap();
        let config = config_with_remote(endpoint.base_url());
        let request = IdentificationRequest::text("pizza box").unwrap();

        let failure = backend.query(&request, &config).await.unwrap_err();
        assert!(matches!(failure, BackendFailure::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_failure() {
        let backend = RemoteGenerativeBackend::new().unwrap();
        let config = config_with_remote(refused_endpoint().await);
        let request = IdentificationRequest::text("pizza box").unwrap();

        let failure = backend.query(&request, &config).await.unwrap_err();
        assert!(matches!(failure, BackendFailure::Network(_)));
    }
}
