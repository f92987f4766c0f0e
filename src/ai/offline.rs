use async_trait::async_trait;
use rust_decimal_macros::dec;

use crate::ai::{ConversationalAdvisor, DocumentExtractor, RiskAssessor};
use crate::application::LoanApplication;
use crate::chat::ChatSession;
use crate::errors::{LendingError, Result};
use crate::products;
use crate::types::{ExtractedDocument, RiskAssessment, RiskStatus};

/// rule-of-thumb advisor used when no api key is configured
///
/// Applies the same thresholds the hosted model is prompted with: a
/// debt-to-income ratio above 45% or a credit score below 600 is high risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAdvisor;

impl OfflineAdvisor {
    pub const MIN_CREDIT_SCORE: u32 = 600;

    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, application: &LoanApplication) -> RiskAssessment {
        let mut concerns = Vec::new();
        let mut tips = Vec::new();

        let dti = application.debt_to_income();
        match dti {
            Some(ratio) if ratio.as_decimal() > dec!(0.45) => {
                concerns.push(format!("debt-to-income ratio of {} is above 45%", ratio));
                tips.push("Pay down existing balances to bring monthly debt under 45% of income.".to_string());
            }
            Some(_) => {}
            None => {
                concerns.push("annual income was not provided".to_string());
                tips.push("Add your annual income or upload a recent paystub.".to_string());
            }
        }

        if application.credit_score_estimate < Self::MIN_CREDIT_SCORE {
            concerns.push(format!(
                "estimated credit score of {} is below {}",
                application.credit_score_estimate,
                Self::MIN_CREDIT_SCORE
            ));
            tips.push("Keep card utilisation low and payments on time to lift your score.".to_string());
        }

        let high_risk = concerns.len() - usize::from(dti.is_none());
        let status = match (high_risk, dti.is_some()) {
            (0, true) => RiskStatus::PreQualified,
            (n, _) if n >= 2 => RiskStatus::Unlikely,
            _ => RiskStatus::NeedsReview,
        };

        let reasoning = if concerns.is_empty() {
            "Your income, existing debt and credit estimate are within our usual guidelines.".to_string()
        } else {
            format!("We noticed that {}.", concerns.join(" and "))
        };
        if tips.is_empty() {
            tips.push("Have recent paystubs ready to speed up final approval.".to_string());
        }

        log::debug!("offline assessment: {} ({} concerns)", status, concerns.len());
        RiskAssessment {
            status,
            reasoning,
            tips,
        }
    }

    /// keyword reply for the chat widget
    pub fn reply_to(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        if lower.contains("rate") || lower.contains("interest") {
            let rates: Vec<String> = products::catalog()
                .iter()
                .map(|p| format!("{} from {}", p.name(), p.starting_rate))
                .collect();
            format!(
                "Our current starting rates are: {}. Your final rate depends on your credit profile.",
                rates.join(", ")
            )
        } else if lower.contains("credit") || lower.contains("score") {
            "A credit score of 600 or more helps, and 700+ usually unlocks our best rates.".to_string()
        } else if lower.contains("dti") || lower.contains("debt") {
            "We look for monthly debt payments under 45% of your monthly income.".to_string()
        } else if lower.contains("document") || lower.contains("paystub") {
            "Recent paystubs or an income statement are usually all you need to get started.".to_string()
        } else {
            "I can help with rates, credit requirements, debt-to-income and documents. \
             For a personal decision, try our application wizard."
                .to_string()
        }
    }
}

#[async_trait]
impl RiskAssessor for OfflineAdvisor {
    async fn assess(&self, application: &LoanApplication) -> Result<RiskAssessment> {
        Ok(self.evaluate(application))
    }
}

#[async_trait]
impl DocumentExtractor for OfflineAdvisor {
    async fn analyze(&self, _image: &[u8], _mime_type: &str) -> Result<ExtractedDocument> {
        Err(LendingError::Extraction {
            message: "document analysis needs an api key".to_string(),
        })
    }
}

#[async_trait]
impl ConversationalAdvisor for OfflineAdvisor {
    async fn send_message(&self, session: &mut ChatSession, text: &str) -> Result<String> {
        let reply = self.reply_to(text);
        session.record_exchange(text, &reply);
        Ok(reply)
    }
}
