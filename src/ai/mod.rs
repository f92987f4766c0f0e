//! Seams to the generative-ai service.
//!
//! The wizard and chat widget only talk to these traits. [`GeminiClient`]
//! implements all three over HTTP; [`OfflineAdvisor`] answers locally with
//! rules of thumb so the flows still work without an api key.

pub mod gemini;
pub mod offline;

use async_trait::async_trait;

use crate::application::LoanApplication;
use crate::chat::ChatSession;
use crate::errors::Result;
use crate::types::{ExtractedDocument, RiskAssessment};

pub use gemini::GeminiClient;
pub use offline::OfflineAdvisor;

/// reads pay details off a paystub or income statement image
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<ExtractedDocument>;
}

/// preliminary pre-qualification decision for a draft application
#[async_trait]
pub trait RiskAssessor: Send + Sync {
    async fn assess(&self, application: &LoanApplication) -> Result<RiskAssessment>;
}

/// free-form loan advice, one turn at a time
#[async_trait]
pub trait ConversationalAdvisor: Send + Sync {
    /// send `text` within `session` and return the reply text
    ///
    /// Implementations record the exchange in the session on success so the
    /// next turn carries the history.
    async fn send_message(&self, session: &mut ChatSession, text: &str) -> Result<String>;
}
