use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::LendingError;

/// loan product types offered by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoanType {
    #[default]
    #[serde(rename = "Personal Loan")]
    Personal,
    #[serde(rename = "Mortgage")]
    Mortgage,
    #[serde(rename = "Auto Loan")]
    Auto,
    #[serde(rename = "Business Loan")]
    Business,
}

impl LoanType {
    pub const ALL: [LoanType; 4] = [
        LoanType::Personal,
        LoanType::Mortgage,
        LoanType::Auto,
        LoanType::Business,
    ];

    /// label used in forms and prompts
    pub fn label(&self) -> &'static str {
        match self {
            LoanType::Personal => "Personal Loan",
            LoanType::Mortgage => "Mortgage",
            LoanType::Auto => "Auto Loan",
            LoanType::Business => "Business Loan",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanType {
    type Err = LendingError;

    /// accepts the form label or the short name, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LoanType::ALL
            .into_iter()
            .find(|t| {
                t.label().eq_ignore_ascii_case(wanted)
                    || format!("{:?}", t).eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| LendingError::InvalidFieldValue {
                field: "loanType".to_string(),
                value: s.to_string(),
            })
    }
}

/// pre-qualification outcome returned by the risk assessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskStatus {
    #[serde(rename = "Pre-Qualified")]
    PreQualified,
    #[serde(rename = "Needs Review")]
    NeedsReview,
    #[serde(rename = "Unlikely")]
    Unlikely,
}

impl RiskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RiskStatus::PreQualified => "Pre-Qualified",
            RiskStatus::NeedsReview => "Needs Review",
            RiskStatus::Unlikely => "Unlikely",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskStatus {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pre-Qualified" => Ok(RiskStatus::PreQualified),
            "Needs Review" => Ok(RiskStatus::NeedsReview),
            "Unlikely" => Ok(RiskStatus::Unlikely),
            other => Err(LendingError::RiskAssessment {
                message: format!("unrecognised status {:?}", other),
            }),
        }
    }
}

/// preliminary risk assessment attached to a wizard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub status: RiskStatus,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

impl RiskAssessment {
    /// result stored when the assessor fails
    pub fn fallback() -> Self {
        Self {
            status: RiskStatus::NeedsReview,
            reasoning: String::new(),
            tips: Vec::new(),
        }
    }
}

/// financial details read off an uploaded paystub or income statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_pay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_pay: Option<f64>,
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}
