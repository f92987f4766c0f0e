use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};

/// monthly payment and interest totals for a fixed-rate loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentEstimate {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub monthly_payment: f64,
    pub total_interest: f64,
}

impl PaymentEstimate {
    /// everything paid over the life of the loan
    pub fn total_payment(&self) -> f64 {
        self.monthly_payment * f64::from(self.term_months)
    }

    /// (principal, interest) slices for the breakdown chart
    pub fn breakdown(&self) -> [(&'static str, f64); 2] {
        [("Principal", self.principal), ("Interest", self.total_interest)]
    }

    /// monthly payment rounded to whole currency units, as displayed
    pub fn rounded_monthly_payment(&self) -> Money {
        Money::from_f64(self.monthly_payment.round()).unwrap_or(Money::ZERO)
    }

    pub fn monthly_payment_money(&self) -> Money {
        Money::from_f64(self.monthly_payment).unwrap_or(Money::ZERO)
    }

    pub fn total_interest_money(&self) -> Money {
        Money::from_f64(self.total_interest).unwrap_or(Money::ZERO)
    }
}

/// scheduled payment in amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub beginning_balance: f64,
    pub payment_amount: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub ending_balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

/// amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub estimate: PaymentEstimate,
    pub payments: Vec<ScheduledPayment>,
}

impl AmortizationSchedule {
    /// generate the month-by-month breakdown of an equal-installment loan
    pub fn generate(principal: f64, annual_rate_percent: f64, term_months: u32) -> Result<Self> {
        let estimate = AmortizationCalculator::calculate(principal, annual_rate_percent, term_months)?;
        let monthly_rate = monthly_rate(annual_rate_percent);

        let mut payments = Vec::with_capacity(term_months as usize);
        let mut balance = principal;
        let mut cumulative_interest = 0.0;
        let mut cumulative_principal = 0.0;

        for i in 1..=term_months {
            let interest_portion = balance * monthly_rate;
            let mut payment_amount = estimate.monthly_payment;
            let mut principal_portion = payment_amount - interest_portion;

            // last payment absorbs float residue
            if i == term_months {
                principal_portion = balance;
                payment_amount = principal_portion + interest_portion;
            }

            cumulative_interest += interest_portion;
            cumulative_principal += principal_portion;
            let ending_balance = if i == term_months {
                0.0
            } else {
                (balance - principal_portion).max(0.0)
            };

            payments.push(ScheduledPayment {
                payment_number: i,
                beginning_balance: balance,
                payment_amount,
                principal_portion,
                interest_portion,
                ending_balance,
                cumulative_interest,
                cumulative_principal,
            });

            balance = ending_balance;
        }

        Ok(Self { estimate, payments })
    }

    /// get payment for specific period (1-based)
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        let index = payment_number.checked_sub(1)?;
        self.payments.get(index as usize)
    }

    /// get remaining balance after payment
    pub fn balance_after_payment(&self, payment_number: u32) -> f64 {
        self.get_payment(payment_number)
            .map(|p| p.ending_balance)
            .unwrap_or(self.estimate.principal)
    }

    pub fn total_interest(&self) -> f64 {
        self.payments.iter().map(|p| p.interest_portion).sum()
    }

    pub fn total_payment(&self) -> f64 {
        self.payments.iter().map(|p| p.payment_amount).sum()
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// standard fixed-payment amortization calculator
pub struct AmortizationCalculator;

impl AmortizationCalculator {
    /// monthly payment and total interest for principal `P`, annual rate `R`
    /// (percent) and term `N` (months)
    ///
    /// `M = P·r·(1+r)^N / ((1+r)^N − 1)` with `r = R/100/12`, or `M = P/N`
    /// when the rate is zero. `I = M·N − P`.
    pub fn calculate(principal: f64, annual_rate_percent: f64, term_months: u32) -> Result<PaymentEstimate> {
        if term_months == 0 {
            return Err(LendingError::InvalidCalculatorInput {
                message: "term must be at least one month".to_string(),
            });
        }
        if !principal.is_finite() || principal < 0.0 {
            return Err(LendingError::InvalidCalculatorInput {
                message: format!("principal {} is not a non-negative amount", principal),
            });
        }
        if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
            return Err(LendingError::InvalidCalculatorInput {
                message: format!("annual rate {} is not a non-negative percentage", annual_rate_percent),
            });
        }

        let n = f64::from(term_months);
        let r = monthly_rate(annual_rate_percent);
        // (1+r)^N - 1 without cancellation for tiny r
        let growth = (n * r.ln_1p()).exp_m1();
        let (monthly_payment, total_interest) = if growth == 0.0 {
            (principal / n, 0.0)
        } else {
            let monthly = principal * r * (1.0 + growth) / growth;
            (monthly, (monthly * n - principal).max(0.0))
        };

        Ok(PaymentEstimate {
            principal,
            annual_rate_percent,
            term_months,
            monthly_payment,
            total_interest,
        })
    }
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_worked_example() {
        let estimate = AmortizationCalculator::calculate(25_000.0, 7.5, 36).unwrap();
        // r = 0.00625
        assert!((estimate.monthly_payment - 777.66).abs() < 0.01);
        assert!((estimate.total_interest - 2995.60).abs() < 0.01);
        assert_eq!(estimate.rounded_monthly_payment(), Money::from_major(778));
        assert_eq!(estimate.monthly_payment_money().to_string(), "777.66");
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let estimate = AmortizationCalculator::calculate(12_000.0, 0.0, 24).unwrap();
        assert_eq!(estimate.monthly_payment, 500.0);
        assert_eq!(estimate.total_interest, 0.0);
    }

    #[test]
    fn test_interest_identity_holds() {
        for &(p, r, n) in &[
            (1_000.0, 1.0, 12),
            (100_000.0, 20.0, 84),
            (25_000.0, 7.5, 1),
            (350_000.0, 6.25, 360),
            (5_000.0, 0.0, 7),
        ] {
            let estimate = AmortizationCalculator::calculate(p, r, n).unwrap();
            assert_relative_eq!(
                estimate.monthly_payment * f64::from(n) - p,
                estimate.total_interest,
                epsilon = 1e-6
            );
            assert_relative_eq!(estimate.total_payment(), p + estimate.total_interest, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_tiny_rates_approach_straight_line() {
        for &rate in &[1e-14, 1e-12, 1e-9] {
            let estimate = AmortizationCalculator::calculate(12_000.0, rate, 24).unwrap();
            assert!(estimate.monthly_payment.is_finite(), "rate {}", rate);
            assert_relative_eq!(estimate.monthly_payment, 500.0, epsilon = 1e-6);
            assert!(estimate.total_interest >= 0.0, "rate {}", rate);

            let schedule = AmortizationSchedule::generate(12_000.0, rate, 24).unwrap();
            assert!(schedule.payments.iter().all(|p| p.payment_amount.is_finite()));
            assert_eq!(schedule.balance_after_payment(24), 0.0);
        }
    }

    #[test]
    fn test_single_month_term() {
        let estimate = AmortizationCalculator::calculate(1_200.0, 12.0, 1).unwrap();
        // one payment of principal plus one month at 1%
        assert_relative_eq!(estimate.monthly_payment, 1_212.0, epsilon = 1e-9);
    }

    #[test]
    fn test_long_term_stays_finite() {
        let estimate = AmortizationCalculator::calculate(100_000.0, 20.0, 600).unwrap();
        assert!(estimate.monthly_payment.is_finite());
        assert!(estimate.total_interest.is_finite());
        // payment approaches interest-only as the term grows
        assert!(estimate.monthly_payment > 100_000.0 * 0.2 / 12.0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            AmortizationCalculator::calculate(10_000.0, 5.0, 0),
            Err(LendingError::InvalidCalculatorInput { .. })
        ));
        assert!(AmortizationCalculator::calculate(10_000.0, -1.0, 12).is_err());
        assert!(AmortizationCalculator::calculate(f64::NAN, 5.0, 12).is_err());
    }

    #[test]
    fn test_breakdown_slices() {
        let estimate = AmortizationCalculator::calculate(25_000.0, 7.5, 36).unwrap();
        let [principal, interest] = estimate.breakdown();
        assert_eq!(principal, ("Principal", 25_000.0));
        assert_eq!(interest.0, "Interest");
        assert_relative_eq!(interest.1, estimate.total_interest);
    }

    #[test]
    fn test_schedule_pays_down_to_zero() {
        let schedule = AmortizationSchedule::generate(25_000.0, 7.5, 36).unwrap();

        assert_eq!(schedule.payments.len(), 36);

        let first = &schedule.payments[0];
        assert_eq!(first.beginning_balance, 25_000.0);
        assert_relative_eq!(first.interest_portion, 156.25, epsilon = 1e-9);

        let last = schedule.get_payment(36).unwrap();
        assert_eq!(last.ending_balance, 0.0);
        assert!((last.payment_amount - schedule.estimate.monthly_payment).abs() < 0.01);

        assert_relative_eq!(schedule.total_interest(), schedule.estimate.total_interest, epsilon = 1e-6);
        assert_relative_eq!(last.cumulative_principal, 25_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_schedule_interest_declines() {
        let schedule = AmortizationSchedule::generate(10_000.0, 12.0, 12).unwrap();
        for i in 1..schedule.payments.len() {
            assert!(schedule.payments[i].interest_portion < schedule.payments[i - 1].interest_portion);
        }
        assert!(schedule.get_payment(0).is_none());
        assert_eq!(schedule.balance_after_payment(0), 10_000.0);
    }
}
