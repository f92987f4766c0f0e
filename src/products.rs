use serde::Serialize;

use crate::application::LoanApplication;
use crate::decimal::Rate;
use crate::errors::Result;
use crate::payments::{AmortizationCalculator, PaymentEstimate};
use crate::types::LoanType;

/// a loan product card; opening the wizard from it preselects `loan_type`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanProduct {
    pub id: &'static str,
    pub loan_type: LoanType,
    pub starting_rate: Rate,
    pub description: &'static str,
    pub term_options: &'static [u32],
}

impl LoanProduct {
    pub fn name(&self) -> &'static str {
        self.loan_type.label()
    }

    /// payment at the advertised starting rate
    pub fn estimate(&self, principal: f64, term_months: u32) -> Result<PaymentEstimate> {
        AmortizationCalculator::calculate(principal, self.starting_rate.as_percentage_f64(), term_months)
    }
}

pub fn catalog() -> Vec<LoanProduct> {
    vec![
        LoanProduct {
            id: "personal",
            loan_type: LoanType::Personal,
            starting_rate: Rate::from_bps(699),
            description: "Unsecured loans for your personal needs.",
            term_options: &LoanApplication::TERM_OPTIONS,
        },
        LoanProduct {
            id: "mortgage",
            loan_type: LoanType::Mortgage,
            starting_rate: Rate::from_bps(550),
            description: "Buy your dream home with flexible terms.",
            term_options: &LoanApplication::TERM_OPTIONS,
        },
        LoanProduct {
            id: "auto",
            loan_type: LoanType::Auto,
            starting_rate: Rate::from_bps(425),
            description: "Drive away today with our auto financing.",
            term_options: &LoanApplication::TERM_OPTIONS,
        },
        LoanProduct {
            id: "business",
            loan_type: LoanType::Business,
            starting_rate: Rate::from_bps(800),
            description: "Capital to help your business grow.",
            term_options: &LoanApplication::TERM_OPTIONS,
        },
    ]
}

pub fn product_for(loan_type: LoanType) -> Option<LoanProduct> {
    catalog().into_iter().find(|p| p.loan_type == loan_type)
}

/// lowest advertised rate across the catalog
pub fn lowest_rate() -> Option<Rate> {
    catalog().iter().map(|p| p.starting_rate).min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_catalog_covers_every_loan_type() {
        let products = catalog();
        assert_eq!(products.len(), LoanType::ALL.len());
        for loan_type in LoanType::ALL {
            assert!(product_for(loan_type).is_some());
        }
    }

    #[test]
    fn test_starting_rates() {
        assert_eq!(product_for(LoanType::Personal).unwrap().starting_rate.to_string(), "6.99%");
        assert_eq!(product_for(LoanType::Mortgage).unwrap().starting_rate.as_decimal(), dec!(0.055));
        assert_eq!(lowest_rate(), Some(Rate::from_bps(425)));
    }

    #[test]
    fn test_estimate_uses_starting_rate() {
        let auto = product_for(LoanType::Auto).unwrap();
        assert_eq!(auto.name(), "Auto Loan");

        let estimate = auto.estimate(20000.0, 48).unwrap();
        let direct = AmortizationCalculator::calculate(20000.0, 4.25, 48).unwrap();
        assert_relative_eq!(estimate.monthly_payment, direct.monthly_payment, epsilon = 1e-9);
    }
}
