use serde::{Deserialize, Serialize};

use crate::errors::{LendingError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// bi-weekly pay
pub const DEFAULT_PAY_PERIODS_PER_YEAR: u32 = 26;

pub const ADVISOR_SYSTEM_INSTRUCTION: &str = "You are 'Flow', a helpful, professional, and empathetic AI Loan Advisor for LendFlow AI.
Your goal is to assist users in understanding loan products (Personal, Mortgage, Auto, Business),
calculating potential payments (use approximations), and guiding them through the application process.

- Be concise and clear.
- Do not provide binding legal or financial advice, always add a disclaimer if asked for specific investment advice.
- If the user asks about rates, current rates are roughly: Personal (6-12%), Mortgage (6-8%), Auto (5-9%).
- Use Markdown for formatting.";

pub const ADVISOR_GREETING: &str =
    "Hello! I'm Flow, your personal loan advisor. How can I help you finance your goals today?";

/// top level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LendFlowConfig {
    pub advisor: AdvisorConfig,
    pub calculator: CalculatorBounds,
    pub documents: DocumentConfig,
}

/// connection settings for the generative ai service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub system_instruction: String,
    pub greeting: String,
}

/// slider bounds for the payment estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatorBounds {
    pub principal: SliderRange,
    pub annual_rate: SliderRange,
    pub term_months: SliderRange,
}

/// inclusive range with a step, mirroring a range input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// how extracted paystub figures are turned into draft values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub pay_periods_per_year: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_instruction: ADVISOR_SYSTEM_INSTRUCTION.to_string(),
            greeting: ADVISOR_GREETING.to_string(),
        }
    }
}

impl Default for CalculatorBounds {
    fn default() -> Self {
        Self {
            principal: SliderRange::new(1_000.0, 100_000.0, 1_000.0),
            annual_rate: SliderRange::new(1.0, 20.0, 0.1),
            term_months: SliderRange::new(12.0, 84.0, 12.0),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            pay_periods_per_year: DEFAULT_PAY_PERIODS_PER_YEAR,
        }
    }
}

impl SliderRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// clamp into range and snap to the nearest step above `min`
    pub fn snap(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        // tidy float noise from the multiplication (e.g. 7.500000000000001)
        let snapped = ((self.min + steps * self.step) * 1e9).round() / 1e9;
        snapped.min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl LendFlowConfig {
    /// defaults overridden by `GEMINI_API_KEY` (or `API_KEY`), `LENDFLOW_MODEL`
    /// and `LENDFLOW_BASE_URL`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(key) = env_var("GEMINI_API_KEY").or_else(|| env_var("API_KEY")) {
            config.advisor.api_key = key;
        }
        if let Some(model) = env_var("LENDFLOW_MODEL") {
            config.advisor.model = model;
        }
        if let Some(url) = env_var("LENDFLOW_BASE_URL") {
            config.advisor.base_url = url;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.advisor.validate()?;
        for (name, range) in [
            ("principal", self.calculator.principal),
            ("annual_rate", self.calculator.annual_rate),
            ("term_months", self.calculator.term_months),
        ] {
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(LendingError::InvalidConfiguration {
                    message: format!("{} range is empty", name),
                });
            }
        }
        if self.calculator.term_months.min < 1.0 {
            return Err(LendingError::InvalidConfiguration {
                message: "term range must start at one month or more".to_string(),
            });
        }
        if self.calculator.annual_rate.min < 0.0 {
            return Err(LendingError::InvalidConfiguration {
                message: "annual rate range cannot be negative".to_string(),
            });
        }
        if self.documents.pay_periods_per_year == 0 {
            return Err(LendingError::InvalidConfiguration {
                message: "pay_periods_per_year must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl AdvisorConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(LendingError::InvalidConfiguration {
                message: "model name is empty".to_string(),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LendingError::InvalidConfiguration {
                message: format!("base url {:?} is not http(s)", self.base_url),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LendFlowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.advisor.model, "gemini-2.5-flash");
        assert_eq!(config.documents.pay_periods_per_year, 26);
    }

    #[test]
    fn test_slider_snapping() {
        let bounds = CalculatorBounds::default();
        assert_eq!(bounds.principal.snap(25_400.0), 25_000.0);
        assert_eq!(bounds.principal.snap(500.0), 1_000.0);
        assert_eq!(bounds.principal.snap(250_000.0), 100_000.0);
        assert_eq!(bounds.annual_rate.snap(7.53), 7.5);
        assert_eq!(bounds.term_months.snap(40.0), 36.0);
        assert_eq!(bounds.term_months.snap(f64::NAN), 12.0);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = LendFlowConfig::default();
        config.documents.pay_periods_per_year = 0;
        assert!(matches!(
            config.validate(),
            Err(LendingError::InvalidConfiguration { .. })
        ));

        let mut config = LendFlowConfig::default();
        config.calculator.term_months = SliderRange::new(0.0, 84.0, 12.0);
        assert!(config.validate().is_err());

        let mut config = LendFlowConfig::default();
        config.advisor.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_roundtrip_keeps_overrides() {
        let mut config = LendFlowConfig::default();
        config.advisor.model = "gemini-2.0-flash".to_string();
        let json = serde_json::to_string(&config).unwrap();
        let back: LendFlowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.advisor.model, "gemini-2.0-flash");
        assert_eq!(back.calculator, config.calculator);
    }
}
