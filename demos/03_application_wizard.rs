/// application wizard - four step flow with a risk assessment before review
use lendflow_rs::{
    ApplicationField, ApplicationWizard, GeminiClient, LendFlowConfig, LoanType, Money,
    OfflineAdvisor, RiskAssessor, SafeTimeProvider, TimeSource,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== application wizard example ===\n");

    // use the hosted model when an api key is set
    let config = LendFlowConfig::from_env();
    let assessor: Box<dyn RiskAssessor> = match GeminiClient::new(config.advisor.clone()) {
        Ok(client) => Box::new(client),
        Err(_) => {
            println!("no api key set, using offline rules\n");
            Box::new(OfflineAdvisor::new())
        }
    };

    let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
    )));
    let mut wizard = ApplicationWizard::open(Some(LoanType::Auto), time)
        .with_pay_periods(config.documents.pay_periods_per_year);

    // personal info
    wizard.update_field(ApplicationField::FirstName, "Jane")?;
    wizard.update_field(ApplicationField::LastName, "Doe")?;
    wizard.update_field_from_input("email", "jane@example.com")?;
    println!("step: {}", wizard.step().title());
    wizard.next(assessor.as_ref()).await;

    // financials, typed the way a form would send them
    wizard.update_field_from_input("annualIncome", "$84,000")?;
    wizard.update_field_from_input("monthlyDebt", "1,200")?;
    wizard.update_field_from_input("creditScoreEst", "690")?;
    println!("step: {}", wizard.step().title());
    wizard.next(assessor.as_ref()).await;

    // loan details
    wizard.update_field(ApplicationField::Amount, Money::from_major(28_000))?;
    wizard.update_field(ApplicationField::TermMonths, 48u32)?;
    wizard.update_field(ApplicationField::Purpose, "new car")?;
    println!("step: {}", wizard.step().title());
    wizard.next(assessor.as_ref()).await;

    println!("step: {} ({:.0}% complete)\n", wizard.step().title(), wizard.progress() * 100.0);
    if let Some(dti) = wizard.draft().debt_to_income() {
        println!("debt-to-income: {}", dti);
    }
    if let Some(assessment) = wizard.risk_assessment() {
        println!("status: {}", assessment.status);
        println!("reasoning: {}", assessment.reasoning);
        for tip in &assessment.tips {
            println!("  - {}", tip);
        }
    }

    println!("\nsubmitted: {}", wizard.submit());
    println!("events recorded: {}", wizard.events.events().len());
    wizard.close();

    Ok(())
}
