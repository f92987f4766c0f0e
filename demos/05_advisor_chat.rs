/// advisor chat - floating widget conversation
use lendflow_rs::{AdvisorChat, ConversationalAdvisor, GeminiClient, LendFlowConfig, OfflineAdvisor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== advisor chat example ===\n");

    let config = LendFlowConfig::from_env();
    let advisor: Box<dyn ConversationalAdvisor> = match GeminiClient::new(config.advisor.clone()) {
        Ok(client) => Box::new(client),
        Err(_) => Box::new(OfflineAdvisor::new()),
    };

    let mut chat = AdvisorChat::with_config(&config.advisor);
    chat.open();

    for question in [
        "What rates do you offer?",
        "   ",
        "What credit score do I need?",
        "How much debt is too much?",
    ] {
        chat.send(advisor.as_ref(), question).await?;
    }

    for message in chat.messages() {
        println!("[{:?}] {}\n", message.role, message.text);
    }

    if let Some(session) = chat.close() {
        println!("session {} closed after {} turns", session.id(), session.history().len());
    }

    Ok(())
}
