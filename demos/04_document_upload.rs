/// document upload - paystub extraction filling the financials step
use lendflow_rs::{
    ApplicationWizard, DocumentExtractor, ExtractedDocument, GeminiClient, LendFlowConfig,
    LoanType, OfflineAdvisor,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== document upload example ===\n");

    let config = LendFlowConfig::from_env();
    let mut wizard = ApplicationWizard::with_config(Some(LoanType::Personal), &config);

    // anything that is not an image is refused up front
    if let Err(err) = wizard
        .analyze_document(&OfflineAdvisor::new(), "statement.pdf", "application/pdf", vec![0; 16])
        .await
    {
        println!("rejected: {}", err.user_message());
    }

    // with an api key and an image path, run the real extraction
    let image_path = std::env::args().nth(1);
    let extractor: Option<Box<dyn DocumentExtractor>> = GeminiClient::new(config.advisor.clone())
        .ok()
        .map(|client| Box::new(client) as Box<dyn DocumentExtractor>);

    match (extractor, image_path) {
        (Some(extractor), Some(path)) => {
            let bytes = std::fs::read(&path)?;
            let mime_type = if path.to_lowercase().ends_with(".png") { "image/png" } else { "image/jpeg" };
            match wizard.analyze_document(extractor.as_ref(), &path, mime_type, bytes).await {
                Ok(document) => println!("extracted: {}", serde_json::to_string_pretty(&document)?),
                Err(err) => println!("{}", err.user_message()),
            }
        }
        _ => {
            println!("no api key or image given, applying a sample extraction");
            let sample = ExtractedDocument {
                employer_name: Some("Acme Manufacturing".to_string()),
                period: Some("2024-02-01 to 2024-02-14".to_string()),
                gross_pay: Some(3_150.0),
                net_pay: Some(2_412.55),
                confidence: Some(94.0),
            };
            let applied = wizard.apply_extracted_document(&sample);
            println!("employer updated: {}, income updated: {}", applied.employer_updated, applied.income_updated);
        }
    }

    let draft = wizard.draft();
    println!("\nemployer: {}", draft.employer_name);
    println!("annual income: ${}", draft.annual_income);

    Ok(())
}
