//! Generation service contract: produces what the agent would have done,
//! and drafts guideline-update proposals from learned patterns.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reins_types::GuidelineUpdate;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Why content is being generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationPurpose {
    /// An independent alternative to a captured human action.
    AlternativeAction,
    /// Guideline-update proposals from aggregated learning patterns.
    GuidelineProposals,
}

/// A request to the generation service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub purpose: GenerationPurpose,
    /// The assembled prompt context.
    pub prompt: String,
    /// Structured context the service may use alongside the prompt.
    pub context: HashMap<String, String>,
}

impl GenerationRequest {
    pub fn new(purpose: GenerationPurpose, prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            prompt: prompt.into(),
            context: HashMap::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// What the generation service produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// Contract for the external generation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ServiceError>;
}

/// Outcome of parsing free-form generation output into guideline updates.
///
/// Callers must handle the `Fallback` arm explicitly; there is no silent
/// catch that swallows malformed output.
#[derive(Clone, Debug)]
pub enum ProposalParse {
    Parsed(Vec<GuidelineUpdate>),
    Fallback { reason: String },
}

impl ProposalParse {
    /// The parsed updates, or an empty list on the degraded path.
    pub fn into_updates(self) -> Vec<GuidelineUpdate> {
        match self {
            ProposalParse::Parsed(updates) => updates,
            ProposalParse::Fallback { .. } => vec![],
        }
    }
}

/// Parse generation output as a JSON array of guideline updates.
pub fn parse_guideline_proposals(content: &str) -> ProposalParse {
    match serde_json::from_str::<Vec<GuidelineUpdate>>(content) {
        Ok(updates) => ProposalParse::Parsed(updates),
        Err(e) => ProposalParse::Fallback {
            reason: format!("unparseable proposal payload: {}", e),
        },
    }
}

/// A simulated generation service for testing and development.
///
/// Responses are served from a queue when one is present, otherwise the
/// default response is returned. A failing instance errors on every call.
pub struct SimulatedGenerationService {
    queued: Mutex<VecDeque<GenerationResult>>,
    default: GenerationResult,
    fail: bool,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl SimulatedGenerationService {
    /// Always answer with the given content.
    pub fn always(content: impl Into<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default: GenerationResult {
                content: content.into(),
                confidence: 0.8,
                reasoning: "simulated".to_string(),
            },
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Error on every call.
    pub fn failing() -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default: GenerationResult {
                content: String::new(),
                confidence: 0.0,
                reasoning: String::new(),
            },
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response to be served before the default.
    pub fn enqueue(&self, result: GenerationResult) {
        self.queued.lock().unwrap().push_back(result);
    }

    /// Requests observed so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for SimulatedGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ServiceError::Unavailable(
                "simulated generation failure".into(),
            ));
        }
        let queued = self.queued.lock().unwrap().pop_front();
        Ok(queued.unwrap_or_else(|| self.default.clone()))
    }
}
