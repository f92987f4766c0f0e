use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::LoanApplication;
use crate::config::DEFAULT_PAY_PERIODS_PER_YEAR;
use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::types::ExtractedDocument;

/// an image selected for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// accept only `image/*` uploads
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let mime_type = mime_type.into();
        validate_media_type(&mime_type)?;
        Ok(Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub fn validate_media_type(mime_type: &str) -> Result<()> {
    if mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(LendingError::UnsupportedUpload {
            mime_type: mime_type.to_string(),
        })
    }
}

/// what applying an extraction changed on the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppliedDocument {
    pub income_updated: bool,
    pub employer_updated: bool,
}

impl AppliedDocument {
    pub fn changed(&self) -> bool {
        self.income_updated || self.employer_updated
    }
}

/// gross pay for one period scaled to a year
pub fn annualize_gross_pay(gross_pay: f64, pay_periods_per_year: u32) -> Option<Money> {
    let per_period = Money::from_f64(gross_pay)?;
    Some(per_period * Decimal::from(pay_periods_per_year))
}

/// copy extracted figures onto the draft
///
/// Nothing changes unless a non-zero gross pay was read. The employer is
/// only overwritten when the document named one.
pub fn apply_to_application(
    document: &ExtractedDocument,
    application: &mut LoanApplication,
    pay_periods_per_year: u32,
) -> AppliedDocument {
    let mut applied = AppliedDocument::default();

    let gross_pay = match document.gross_pay {
        Some(g) if g != 0.0 && g.is_finite() => g,
        _ => return applied,
    };

    if let Some(income) = annualize_gross_pay(gross_pay, pay_periods_per_year) {
        application.annual_income = income;
        applied.income_updated = true;
    }

    if let Some(employer) = document.employer_name.as_deref().filter(|e| !e.trim().is_empty()) {
        application.employer_name = employer.to_string();
        applied.employer_updated = true;
    }

    applied
}

/// same as [`apply_to_application`] with bi-weekly pay assumed
pub fn apply_biweekly(document: &ExtractedDocument, application: &mut LoanApplication) -> AppliedDocument {
    apply_to_application(document, application, DEFAULT_PAY_PERIODS_PER_YEAR)
}
