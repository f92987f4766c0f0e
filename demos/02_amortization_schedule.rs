/// amortization schedule - month by month breakdown and json output
use lendflow_rs::products;
use lendflow_rs::{AmortizationSchedule, LoanType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== amortization schedule example ===\n");

    let schedule = AmortizationSchedule::generate(10_000.0, 6.0, 12)?;

    println!("{:>3} {:>10} {:>10} {:>10} {:>10}", "#", "payment", "principal", "interest", "balance");
    for row in &schedule.payments {
        println!(
            "{:>3} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            row.payment_number,
            row.payment_amount,
            row.principal_portion,
            row.interest_portion,
            row.ending_balance
        );
    }
    println!("\ntotal interest: ${:.2}", schedule.total_interest());
    println!("balance after 6 payments: ${:.2}", schedule.balance_after_payment(6));

    // same loan at each product's starting rate
    println!("\nstarting-rate comparison ($10,000 over 12 months):");
    for product in products::catalog() {
        let estimate = product.estimate(10_000.0, 12)?;
        println!("  {:<14} {:>7} -> ${:.2}/mo", product.name(), product.starting_rate.to_string(), estimate.monthly_payment);
    }

    let mortgage = products::product_for(LoanType::Mortgage).ok_or("no mortgage product")?;
    let first_rows = AmortizationSchedule::generate(200_000.0, mortgage.starting_rate.as_percentage_f64(), 60)?;
    println!("\nfirst payment of a 60 month mortgage:");
    if let Some(first) = first_rows.get_payment(1) {
        println!("{}", serde_json::to_string_pretty(first)?);
    }

    Ok(())
}
