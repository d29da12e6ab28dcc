//! Complaint triage.
//!
//! Two signals decide how urgent a new complaint is:
//!
//! - [`HazardDetector`], a keyword scan over the text plus a category rule.
//!   It is deterministic and always runs.
//! - A [`TriageClassifier`], normally an external object-detection service
//!   looking at the first attached image. Every call is bounded by a timeout and
//!   any failure degrades to `Low` with no tags.
//!
//! The classifier can only escalate a complaint, never hold one back.

use std::{sync::Arc, time::Duration};

use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use hostel_common::{AppError, AppResult, config::TriageConfig};
use hostel_db::entities::complaint::{Category, ComplaintStatus, Urgency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::lifecycle::initial_state;

/// Tag recorded when the classifier produced no labels.
pub const TEXT_TRIAGED: &str = "Text-Triaged";

const HAZARD_KEYWORDS: [&str; 7] = [
    "fire",
    "spark",
    "electric",
    "smoke",
    "emergency",
    "blast",
    "short circuit",
];

/// Errors raised by a classifier. Never surfaced to API callers.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("classifier transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier returned HTTP {0}")]
    Status(u16),

    #[error("classifier response could not be decoded: {0}")]
    Decode(String),
}

impl From<TriageError> for AppError {
    fn from(err: TriageError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// What the classifier gets to look at.
#[derive(Debug, Clone, Default)]
pub struct TriageInput {
    pub text: String,
    pub image_url: Option<String>,
}

/// Classifier verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub urgency: Urgency,
    pub tags: Vec<String>,
}

/// Outcome of triaging a new complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub status: ComplaintStatus,
    pub urgency: Urgency,
    pub tags: Vec<String>,
}

/// Urgency classifier for complaint content.
#[async_trait]
pub trait TriageClassifier: Send + Sync {
    /// Classify one complaint.
    async fn classify(&self, input: &TriageInput) -> Result<Classification, TriageError>;
}

/// Classifier used when no detection endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct NoOpClassifier;

#[async_trait]
impl TriageClassifier for NoOpClassifier {
    async fn classify(&self, _input: &TriageInput) -> Result<Classification, TriageError> {
        Ok(Classification::default())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectionRequest<'a> {
    image_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    #[serde(default)]
    labels: Vec<DetectedLabel>,
}

#[derive(Debug, Deserialize)]
struct DetectedLabel {
    label: String,
    score: f32,
}

/// Object-detection classifier reached over HTTP.
///
/// Sends `{"imageUrl": ...}` and expects `{"labels": [{"label", "score"}]}`.
/// Complaints without an image are classified without a request.
pub struct HttpClassifier {
    endpoint: String,
    min_score: f32,
    hazard_labels: Vec<String>,
    request_timeout: Duration,
    client: OnceCell<reqwest::Client>,
}

impl HttpClassifier {
    /// Create a classifier for `endpoint`. The HTTP client is built on first use.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, config: &TriageConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            min_score: config.min_score,
            hazard_labels: config
                .hazard_labels
                .iter()
                .map(|l| l.trim().to_lowercase())
                .collect(),
            request_timeout: Duration::from_millis(config.timeout_ms),
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&reqwest::Client, TriageError> {
        self.client
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .timeout(self.request_timeout)
                    .build()
            })
            .await
            .map_err(TriageError::from)
    }

    fn interpret(&self, labels: Vec<DetectedLabel>) -> Classification {
        let mut tags: Vec<String> = Vec::new();
        for detected in labels {
            if detected.score < self.min_score {
                continue;
            }
            let label = detected.label.trim().to_lowercase();
            if !label.is_empty() && !tags.contains(&label) {
                tags.push(label);
            }
        }

        let urgency = if tags.iter().any(|t| self.hazard_labels.contains(t)) {
            Urgency::High
        } else {
            Urgency::Low
        };

        Classification { urgency, tags }
    }
}

#[async_trait]
impl TriageClassifier for HttpClassifier {
    async fn classify(&self, input: &TriageInput) -> Result<Classification, TriageError> {
        let Some(image_url) = input.image_url.as_deref() else {
            return Ok(Classification::default());
        };

        let response = self
            .client()
            .await?
            .post(&self.endpoint)
            .json(&DetectionRequest { image_url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::Status(status.as_u16()));
        }

        let body: DetectionResponse = response
            .json()
            .await
            .map_err(|e| TriageError::Decode(e.to_string()))?;

        Ok(self.interpret(body.labels))
    }
}

/// Keyword and category hazard rules.
#[derive(Debug, Clone)]
pub struct HazardDetector {
    matcher: AhoCorasick,
}

impl HazardDetector {
    /// Build the keyword matcher.
    pub fn new() -> AppResult<Self> {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(HAZARD_KEYWORDS)
            .map_err(|e| AppError::Internal(format!("Failed to build hazard matcher: {e}")))?;
        Ok(Self { matcher })
    }

    /// Whether the title or description mentions a hazard keyword.
    #[must_use]
    pub fn text_is_hazard(&self, title: &str, description: &str) -> bool {
        let text = format!("{title} {description}").to_lowercase();
        self.matcher.is_match(&text)
    }

    /// Electrical problems are always treated as hazards.
    #[must_use]
    pub const fn category_is_hazard(category: Category) -> bool {
        matches!(category, Category::Electrical)
    }
}

/// Triage pipeline shared by complaint creation.
#[derive(Clone)]
pub struct Triage {
    classifier: Arc<dyn TriageClassifier>,
    timeout: Duration,
    hazard: HazardDetector,
}

impl Triage {
    /// Create a pipeline around `classifier`.
    pub fn new(classifier: Arc<dyn TriageClassifier>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            classifier,
            timeout,
            hazard: HazardDetector::new()?,
        })
    }

    /// Choose the HTTP classifier when an endpoint is configured.
    pub fn from_config(config: &TriageConfig) -> AppResult<Self> {
        let classifier: Arc<dyn TriageClassifier> = match config.image_endpoint() {
            Some(endpoint) => Arc::new(HttpClassifier::new(endpoint, config)),
            None => Arc::new(NoOpClassifier),
        };
        Self::new(classifier, Duration::from_millis(config.timeout_ms))
    }

    /// Run the classifier, falling back to `Low` with no tags on any failure.
    pub async fn classify(&self, input: &TriageInput) -> Classification {
        let outcome = match tokio::time::timeout(self.timeout, self.classifier.classify(input)).await
        {
            Ok(result) => result,
            Err(_) => Err(TriageError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(classification) => classification,
            Err(e) => {
                let err = AppError::from(e);
                warn!(error = %err, "Triage classifier failed, using text triage");
                Classification::default()
            }
        }
    }

    /// Decide the initial status, urgency and tags of a new complaint.
    pub async fn assess(
        &self,
        title: &str,
        description: &str,
        category: Category,
        image_url: Option<&str>,
    ) -> Assessment {
        let text_hazard = self.hazard.text_is_hazard(title, description);
        let category_hazard = HazardDetector::category_is_hazard(category);

        let classification = self
            .classify(&TriageInput {
                text: format!("{title} {description}"),
                image_url: image_url.map(str::to_string),
            })
            .await;

        let mut tags: Vec<String> = Vec::new();
        for tag in classification.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.is_empty() {
            tags.push(TEXT_TRIAGED.to_string());
        }

        let (status, urgency) = initial_state(text_hazard, category_hazard, classification.urgency);
        debug!(
            text_hazard,
            category_hazard,
            classifier_urgency = classification.urgency.as_str(),
            status = status.as_str(),
            "Triage assessed complaint"
        );

        Assessment {
            status,
            urgency,
            tags,
        }
    }
}
