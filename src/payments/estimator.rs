use serde::{Deserialize, Serialize};

use crate::config::CalculatorBounds;
use crate::errors::Result;
use crate::payments::amortization::{AmortizationCalculator, AmortizationSchedule, PaymentEstimate};

/// inputs behind the quick payment estimator
///
/// Every setter clamps the value to its slider range and returns the freshly
/// recomputed estimate, so callers never hold a stale result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEstimator {
    bounds: CalculatorBounds,
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
}

impl Default for PaymentEstimator {
    fn default() -> Self {
        Self::new(CalculatorBounds::default())
    }
}

impl PaymentEstimator {
    pub const DEFAULT_PRINCIPAL: f64 = 25_000.0;
    pub const DEFAULT_RATE_PERCENT: f64 = 7.5;
    pub const DEFAULT_TERM_MONTHS: u32 = 36;

    pub fn new(bounds: CalculatorBounds) -> Self {
        Self {
            principal: bounds.principal.snap(Self::DEFAULT_PRINCIPAL),
            annual_rate_percent: bounds.annual_rate.snap(Self::DEFAULT_RATE_PERCENT),
            term_months: snap_term(&bounds, f64::from(Self::DEFAULT_TERM_MONTHS)),
            bounds,
        }
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> f64 {
        self.annual_rate_percent
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn bounds(&self) -> &CalculatorBounds {
        &self.bounds
    }

    pub fn set_principal(&mut self, principal: f64) -> Result<PaymentEstimate> {
        self.principal = self.bounds.principal.snap(principal);
        log::debug!("estimator principal set to {}", self.principal);
        self.estimate()
    }

    pub fn set_annual_rate(&mut self, annual_rate_percent: f64) -> Result<PaymentEstimate> {
        self.annual_rate_percent = self.bounds.annual_rate.snap(annual_rate_percent);
        log::debug!("estimator rate set to {}%", self.annual_rate_percent);
        self.estimate()
    }

    pub fn set_term_months(&mut self, term_months: u32) -> Result<PaymentEstimate> {
        self.term_months = snap_term(&self.bounds, f64::from(term_months));
        log::debug!("estimator term set to {} months", self.term_months);
        self.estimate()
    }

    /// term expressed in years, as shown next to the term slider
    pub fn term_years(&self) -> f64 {
        f64::from(self.term_months) / 12.0
    }

    pub fn estimate(&self) -> Result<PaymentEstimate> {
        AmortizationCalculator::calculate(self.principal, self.annual_rate_percent, self.term_months)
    }

    pub fn schedule(&self) -> Result<AmortizationSchedule> {
        AmortizationSchedule::generate(self.principal, self.annual_rate_percent, self.term_months)
    }
}

fn snap_term(bounds: &CalculatorBounds, months: f64) -> u32 {
    // never zero, whatever the configured range says
    bounds.term_months.snap(months).round().max(1.0) as u32
}
