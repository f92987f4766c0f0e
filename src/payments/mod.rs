pub mod amortization;
pub mod estimator;

pub use amortization::{AmortizationCalculator, AmortizationSchedule, PaymentEstimate, ScheduledPayment};
pub use estimator::PaymentEstimator;
