use thiserror::Error;

#[derive(Error, Debug)]
pub enum LendingError {
    #[error("unsupported upload type: {mime_type}")]
    UnsupportedUpload {
        mime_type: String,
    },

    #[error("document extraction failed: {message}")]
    Extraction {
        message: String,
    },

    #[error("risk assessment failed: {message}")]
    RiskAssessment {
        message: String,
    },

    #[error("advisor chat failed: {message}")]
    Chat {
        message: String,
    },

    #[error("no chat session open")]
    ChatClosed,

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generative api returned {status}: {body}")]
    Api {
        status: u16,
        body: String,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid calculator input: {message}")]
    InvalidCalculatorInput {
        message: String,
    },

    #[error("unknown application field: {name}")]
    UnknownField {
        name: String,
    },

    #[error("invalid value for {field}: {value:?}")]
    InvalidFieldValue {
        field: String,
        value: String,
    },
}

impl LendingError {
    /// inline text shown to the user when an operation degrades
    pub fn user_message(&self) -> String {
        match self {
            LendingError::UnsupportedUpload { .. } => {
                "Please upload an image file (JPG, PNG).".to_string()
            }
            LendingError::Extraction { .. } => {
                "AI Analysis failed. Please try again or enter details manually.".to_string()
            }
            LendingError::RiskAssessment { .. } => "Could not automatically assess.".to_string(),
            LendingError::Chat { .. }
            | LendingError::ChatClosed
            | LendingError::Http(_)
            | LendingError::Api { .. } => {
                "Sorry, I'm experiencing connection issues. Please check your network or API Key."
                    .to_string()
            }
            LendingError::InvalidFieldValue { field, .. } => {
                format!("Please enter a valid value for {}.", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_upload_message() {
        let err = LendingError::UnsupportedUpload {
            mime_type: "application/pdf".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported upload type: application/pdf");
        assert_eq!(err.user_message(), "Please upload an image file (JPG, PNG).");
    }

    #[test]
    fn test_field_value_message() {
        let err = LendingError::InvalidFieldValue {
            field: "annualIncome".to_string(),
            value: "lots".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for annualIncome: \"lots\"");
        assert_eq!(err.user_message(), "Please enter a valid value for annualIncome.");
    }
}
