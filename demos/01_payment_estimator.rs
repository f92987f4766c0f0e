/// payment estimator - slider-driven calculator with snapped inputs
use lendflow_rs::{LendFlowConfig, PaymentEstimator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== payment estimator example ===\n");

    let config = LendFlowConfig::default();
    let mut estimator = PaymentEstimator::new(config.calculator);

    let estimate = estimator.estimate()?;
    println!(
        "defaults: ${} at {}% for {} months -> ${}/mo",
        estimator.principal(),
        estimator.annual_rate_percent(),
        estimator.term_months(),
        estimate.rounded_monthly_payment()
    );

    // values are snapped to the slider ranges
    let estimate = estimator.set_principal(43_210.0)?;
    println!("principal 43210 snaps to {} -> ${}/mo", estimator.principal(), estimate.rounded_monthly_payment());

    let estimate = estimator.set_annual_rate(25.0)?;
    println!("rate 25 clamps to {}% -> ${}/mo", estimator.annual_rate_percent(), estimate.rounded_monthly_payment());

    let estimate = estimator.set_term_months(60)?;
    println!("term {} months ({} years) -> ${}/mo", estimator.term_months(), estimator.term_years(), estimate.rounded_monthly_payment());

    println!("\nbreakdown:");
    for (label, amount) in estimate.breakdown() {
        println!("  {:<10} ${:.2}", label, amount);
    }

    Ok(())
}
