/// quick start - minimal example to get started
use lendflow_rs::AmortizationCalculator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // $25,000 over 36 months at 7.5%
    let estimate = AmortizationCalculator::calculate(25_000.0, 7.5, 36)?;

    println!("monthly payment: ${}", estimate.rounded_monthly_payment());
    println!("total interest:  ${:.2}", estimate.total_interest);
    println!("total paid:      ${:.2}", estimate.total_payment());

    Ok(())
}
