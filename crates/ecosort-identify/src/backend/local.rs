use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{BackendHealth, BackendKind, IdentificationBackend};
use crate::category::Category;
use crate::config::ResolverConfig;
use crate::error::{BackendFailure, IdentifyError};
use crate::request::{IdentificationRequest, ImagePayload};
use crate::result::IdentificationResult;

/// Image classifier reachable over HTTP at one of several candidate hosts.
pub struct LocalModelBackend {
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    file: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    class_name: Option<String>,
    category: Option<String>,
    confidence: Option<f64>,
    is_recyclable: Option<bool>,
}

/// A reply that passed shape validation.
#[derive(Debug, Clone, PartialEq)]
struct Prediction {
    class_name: String,
    category: Category,
    confidence: f64,
    recyclable: bool,
}

impl LocalModelBackend {
    pub fn new() -> Result<Self, IdentifyError> {
        Ok(Self::with_client(reqwest::Client::builder().build()?))
    }

    /// Shares an existing connection pool.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn predict(
        &self,
        base_url: &str,
        image: &ImagePayload,
        config: &ResolverConfig,
    ) -> Result<Prediction, BackendFailure> {
        let url = endpoint_url(base_url, "predict");
        let response = self
            .client
            .post(&url)
            .timeout(config.request_timeout())
            .json(&PredictRequest {
                file: image.stripped(),
            })
            .send()
            .await
            .map_err(|error| BackendFailure::from_reqwest(&url, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendFailure::Protocol {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| BackendFailure::from_reqwest(&url, error))?;
        parse_prediction(&body)
    }
}

#[async_trait]
impl IdentificationBackend for LocalModelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalModel
    }

    fn supports(&self, request: &IdentificationRequest) -> bool {
        matches!(request, IdentificationRequest::ImageCapture { .. })
    }

    async fn query(
        &self,
        request: &IdentificationRequest,
        config: &ResolverConfig,
    ) -> Result<IdentificationResult, BackendFailure> {
        let IdentificationRequest::ImageCapture { image } = request else {
            return Err(BackendFailure::Malformed(
                "local model only classifies camera images".to_string(),
            ));
        };

        let total = config.candidate_endpoints.len();
        let mut last_failure =
            BackendFailure::Network("no local model endpoint configured".to_string());
        for (index, base_url) in config.candidate_endpoints.iter().enumerate() {
            tracing::debug!(
                attempt = index + 1,
                total,
                endpoint = %base_url,
                image_len = image.len(),
                "requesting local model prediction"
            );
            // Any failed reply moves on to the next host.
            let prediction = match self.predict(base_url, image, config).await {
                Ok(prediction) => prediction,
                Err(failure) => {
                    tracing::warn!(endpoint = %base_url, "local model attempt failed: {failure}");
                    last_failure = failure;
                    continue;
                }
            };

            if prediction.confidence < config.confidence_threshold {
                return Err(BackendFailure::LowConfidence {
                    confidence: prediction.confidence,
                    threshold: config.confidence_threshold,
                });
            }
            return Ok(IdentificationResult::classified(
                prediction.class_name,
                prediction.category,
                prediction.recyclable,
            ));
        }
        Err(last_failure)
    }

    async fn health(&self, config: &ResolverConfig) -> BackendHealth {
        for base_url in &config.candidate_endpoints {
            let url = endpoint_url(base_url, "health");
            let healthy = self
                .client
                .get(&url)
                .timeout(config.request_timeout())
                .send()
                .await
                .map(|response| response.status().is_success())
                .unwrap_or(false);
            if healthy {
                return BackendHealth {
                    available: true,
                    endpoint: base_url.clone(),
                };
            }
            tracing::debug!(endpoint = %base_url, "local model health check failed");
        }
        BackendHealth {
            available: false,
            endpoint: config.candidate_endpoints.first().cloned().unwrap_or_default(),
        }
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

fn parse_prediction(body: &[u8]) -> Result<Prediction, BackendFailure> {
    let raw: PredictResponse = serde_json::from_slice(body)
        .map_err(|error| BackendFailure::Malformed(format!("prediction body: {error}")))?;

    let class_name = raw
        .class_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BackendFailure::Malformed("missing class_name".to_string()))?;
    let category = raw
        .category
        .filter(|category| !category.trim().is_empty())
        .ok_or_else(|| BackendFailure::Malformed("missing category".to_string()))?;
    let recyclable = raw
        .is_recyclable
        .ok_or_else(|| BackendFailure::Malformed("missing is_recyclable".to_string()))?;
    let confidence = raw
        .confidence
        .ok_or_else(|| BackendFailure::Malformed("missing confidence".to_string()))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(BackendFailure::Malformed(format!(
            "confidence out of range: {confidence}"
        )));
    }

    Ok(Prediction {
        class_name,
        category: Category::coerce(&category),
        confidence,
        recyclable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        can_prediction, config_with_endpoints, refused_endpoint, MockEndpoint, MockReply, PIXEL,
    };
    use serde_json::json;
    use std::time::Duration;

    fn image_request() -> IdentificationRequest {
        IdentificationRequest::image(format!("data:image/jpeg;base64,{PIXEL}")).unwrap()
    }

    #[test]
    fn parses_valid_prediction_and_ignores_extra_fields() {
        let body = json!({
            "class_id": 3,
            "class_name": "Aluminum Can",
            "category": "metal",
            "confidence": 0.95,
            "is_recyclable": true,
            "predictions": [0.01, 0.95]
        });
        let prediction = parse_prediction(body.to_string().as_bytes()).unwrap();
        assert_eq!(prediction.class_name, "Aluminum Can");
        assert_eq!(prediction.category, Category::Metal);
        assert!(prediction.recyclable);
    }

    #[test]
    fn rejects_incomplete_predictions() {
        let cases = [
            json!({"category": "metal", "confidence": 0.9, "is_recyclable": true}),
            json!({"class_name": "", "category": "metal", "confidence": 0.9, "is_recyclable": true}),
            json!({"class_name": "Can", "confidence": 0.9, "is_recyclable": true}),
            json!({"class_name": "Can", "category": "metal", "confidence": 0.9, "is_recyclable": "yes"}),
            json!({"class_name": "Can", "category": "metal", "is_recyclable": true}),
            json!({"class_name": "Can", "category": "metal", "confidence": 1.4, "is_recyclable": true}),
        ];
        for body in cases {
            let result = parse_prediction(body.to_string().as_bytes());
            assert!(
                matches!(result, Err(BackendFailure::Malformed(_))),
                "expected malformed for {body}"
            );
        }
        assert!(matches!(
            parse_prediction(b"<html>"),
            Err(BackendFailure::Malformed(_))
        ));
    }

    #[test]
    fn unknown_category_is_coerced() {
        let body = json!({
            "class_name": "Mystery Ore",
            "category": "unobtainium",
            "confidence": 0.9,
            "is_recyclable": true
        });
        let prediction = parse_prediction(body.to_string().as_bytes()).unwrap();
        assert_eq!(prediction.category, Category::Mixed);
    }

    #[test]
    fn only_camera_images_are_supported() {
        let backend = LocalModelBackend::new().unwrap();
        assert!(backend.supports(&image_request()));
        assert!(!backend.supports(&IdentificationRequest::barcode(PIXEL).unwrap()));
        assert!(!backend.supports(&IdentificationRequest::text("can").unwrap()));
    }

    #[tokio::test]
    async fn sends_stripped_base64_in_file_field() {
        let endpoint = MockEndpoint::start(vec![MockReply::json(200, can_prediction(0.95))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![endpoint.base_url()]);

        let result = backend.query(&image_request(), &config).await.unwrap();
        assert_eq!(result.item, "Aluminum Can");
        assert_eq!(result.category, Category::Metal);

        let bodies = endpoint.bodies();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0], json!({ "file": PIXEL }));
        assert_eq!(endpoint.paths(), vec!["/predict"]);
    }

    #[tokio::test]
    async fn tries_candidates_in_order_until_one_succeeds() {
        let refused = refused_endpoint().await;
        let failing = MockEndpoint::start(vec![MockReply::json(500, json!({"detail": "boom"}))]).await;
        let healthy = MockEndpoint::start(vec![MockReply::json(200, can_prediction(0.9))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![refused, failing.base_url(), healthy.base_url()]);

        let result = backend.query(&image_request(), &config).await.unwrap();
        assert_eq!(result.item, "Aluminum Can");
        assert_eq!(failing.hits(), 1);
        assert_eq!(healthy.hits(), 1);
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let first = MockEndpoint::start(vec![MockReply::json(200, can_prediction(0.9))]).await;
        let second = MockEndpoint::start(vec![MockReply::json(200, can_prediction(0.9))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![first.base_url(), second.base_url()]);

        backend.query(&image_request(), &config).await.unwrap();
        assert_eq!(first.hits(), 1);
        assert_eq!(second.hits(), 0);
    }

    #[tokio::test]
    async fn malformed_reply_moves_on_to_next_candidate() {
        let warming = MockEndpoint::start(vec![MockReply::json(200, json!({"detail": "warming up"}))]).await;
        let healthy = MockEndpoint::start(vec![MockReply::json(200, can_prediction(0.95))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![warming.base_url(), healthy.base_url()]);

        let result = backend.query(&image_request(), &config).await.unwrap();
        assert_eq!(result.item, "Aluminum Can");
        assert_eq!(warming.hits(), 1);
        assert_eq!(healthy.hits(), 1);
    }

    #[tokio::test]
    async fn malformed_last_candidate_is_reported() {
        let down = MockEndpoint::start(vec![MockReply::json(503, json!({}))]).await;
        let garbled = MockEndpoint::start(vec![MockReply::json(200, json!({"class_name": "Can"}))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![down.base_url(), garbled.base_url()]);

        let failure = backend.query(&image_request(), &config).await.unwrap_err();
        assert!(matches!(failure, BackendFailure::Malformed(_)));
    }

    #[tokio::test]
    async fn low_confidence_fails_without_trying_other_hosts() {
        let first = MockEndpoint::start(vec![MockReply::json(200, can_prediction(0.4))]).await;
        let second = MockEndpoint::start(vec![MockReply::json(200, can_prediction(0.9))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![first.base_url(), second.base_url()]);

        let failure = backend.query(&image_request(), &config).await.unwrap_err();
        assert_eq!(
            failure,
            BackendFailure::LowConfidence {
                confidence: 0.4,
                threshold: 0.7
            }
        );
        assert_eq!(second.hits(), 0);
    }

    #[tokio::test]
    async fn timeouts_count_as_network_failures() {
        let slow = MockEndpoint::start(vec![
            MockReply::json(200, can_prediction(0.9)).delayed(Duration::from_secs(2))
        ])
        .await;
        let backend = LocalModelBackend::new().unwrap();
        let mut config = config_with_endpoints(vec![slow.base_url()]);
        config.request_timeout_ms = 100;

        let failure = backend.query(&image_request(), &config).await.unwrap_err();
        assert!(matches!(failure, BackendFailure::Network(message) if message.contains("timed out")));
    }

    #[tokio::test]
    async fn all_candidates_down_reports_last_failure() {
        let first = MockEndpoint::start(vec![MockReply::json(502, json!({}))]).await;
        let second = MockEndpoint::start(vec![MockReply::json(503, json!({}))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![first.base_url(), second.base_url()]);

        let failure = backend.query(&image_request(), &config).await.unwrap_err();
        assert_eq!(failure, BackendFailure::Protocol { status: 503 });
    }

    #[tokio::test]
    async fn health_reports_first_reachable_candidate() {
        let refused = refused_endpoint().await;
        let healthy = MockEndpoint::start(vec![MockReply::json(200, json!({"status": "ok"}))]).await;
        let backend = LocalModelBackend::new().unwrap();
        let config = config_with_endpoints(vec![refused.clone(), healthy.base_url()]);

        let health = backend.health(&config).await;
        assert!(health.available);
        assert_eq!(health.endpoint, healthy.base_url());
        assert_eq!(healthy.paths(), vec!["/health"]);

        let config = config_with_endpoints(vec![refused.clone()]);
        let health = backend.health(&config).await;
        assert!(!health.available);
        assert_eq!(health.endpoint, refused);
    }
}
