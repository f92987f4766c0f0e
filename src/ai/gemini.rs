use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ai::{ConversationalAdvisor, DocumentExtractor, RiskAssessor};
use crate::application::LoanApplication;
use crate::chat::ChatSession;
use crate::config::AdvisorConfig;
use crate::errors::{LendingError, Result};
use crate::types::{ChatRole, ExtractedDocument, RiskAssessment, RiskStatus};

const DOCUMENT_PROMPT: &str = "Analyze this document. If it looks like a paystub or income statement, extract the Employer Name, Gross Pay (for the period), and Net Pay. Return the result as JSON.";

/// client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    http: reqwest::Client,
    config: AdvisorConfig,
}

impl GeminiClient {
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        config.validate()?;
        if config.api_key.trim().is_empty() {
            return Err(LendingError::InvalidConfiguration {
                message: "api key is required for the gemini client".to_string(),
            });
        }
        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// post a request and return the text of the first candidate
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        log::debug!("calling {} ({} contents)", self.config.model, request.contents.len());

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("gemini returned {}: {}", status, body);
            return Err(LendingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        Ok(body.text())
    }
}

#[async_trait]
impl DocumentExtractor for GeminiClient {
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<ExtractedDocument> {
        let request = document_request(image, mime_type);
        let text = self.generate(&request).await.map_err(|err| LendingError::Extraction {
            message: err.to_string(),
        })?;
        parse_extracted_document(&text)
    }
}

#[async_trait]
impl RiskAssessor for GeminiClient {
    async fn assess(&self, application: &LoanApplication) -> Result<RiskAssessment> {
        let request = risk_request(application)?;
        let text = self.generate(&request).await.map_err(|err| LendingError::RiskAssessment {
            message: err.to_string(),
        })?;
        parse_risk_assessment(&text)
    }
}

#[async_trait]
impl ConversationalAdvisor for GeminiClient {
    async fn send_message(&self, session: &mut ChatSession, text: &str) -> Result<String> {
        let request = chat_request(session, text);
        let reply = self.generate(&request).await.map_err(|err| LendingError::Chat {
            message: err.to_string(),
        })?;
        session.record_exchange(text, &reply);
        Ok(reply)
    }
}

// wire types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// base64
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// concatenated text parts of the first candidate, empty if none
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

fn json_output(schema: serde_json::Value) -> Option<GenerationConfig> {
    Some(GenerationConfig {
        response_mime_type: "application/json".to_string(),
        response_schema: schema,
    })
}

// request builders

pub fn document_request(image: &[u8], mime_type: &str) -> GenerateContentRequest {
    let image_part = Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(image),
        }),
    };

    GenerateContentRequest {
        contents: vec![Content::user(vec![image_part, Part::text(DOCUMENT_PROMPT)])],
        system_instruction: None,
        generation_config: json_output(json!({
            "type": "OBJECT",
            "properties": {
                "employerName": { "type": "STRING", "description": "Name of the employer or payer" },
                "period": { "type": "STRING", "description": "Pay period dates if available" },
                "grossPay": { "type": "NUMBER", "description": "Gross pay amount for the current period" },
                "netPay": { "type": "NUMBER", "description": "Net pay amount for the current period" },
                "confidence": { "type": "NUMBER", "description": "Confidence score 0-100" }
            }
        })),
    }
}

pub fn risk_request(application: &LoanApplication) -> Result<GenerateContentRequest> {
    let prompt = format!(
        "Assess this loan application data for a preliminary pre-qualification decision.\n\
         Data: {}.\n\n\
         Rules of thumb:\n\
         - Debt-to-Income (DTI) ratio above 45% is high risk.\n\
         - Credit score below 600 is high risk.\n\
         - Return a helpful summary, a status and practical tips.",
        application.to_json()?
    );
    let statuses: Vec<&str> = [RiskStatus::PreQualified, RiskStatus::NeedsReview, RiskStatus::Unlikely]
        .iter()
        .map(|s| s.label())
        .collect();

    Ok(GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text(prompt)])],
        system_instruction: None,
        generation_config: json_output(json!({
            "type": "OBJECT",
            "properties": {
                "status": { "type": "STRING", "enum": statuses },
                "reasoning": { "type": "STRING" },
                "tips": { "type": "ARRAY", "items": { "type": "STRING" } }
            }
        })),
    })
}

pub fn chat_request(session: &ChatSession, text: &str) -> GenerateContentRequest {
    let mut contents: Vec<Content> = session
        .history()
        .iter()
        .map(|turn| Content {
            role: Some(
                match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                }
                .to_string(),
            ),
            parts: vec![Part::text(turn.text.clone())],
        })
        .collect();
    contents.push(Content::user(vec![Part::text(text)]));

    GenerateContentRequest {
        contents,
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part::text(session.system_instruction())],
        }),
        generation_config: None,
    }
}

// response parsing

pub fn parse_extracted_document(text: &str) -> Result<ExtractedDocument> {
    if text.trim().is_empty() {
        return Err(LendingError::Extraction {
            message: "No data returned".to_string(),
        });
    }
    serde_json::from_str(text).map_err(|err| LendingError::Extraction {
        message: format!("unreadable extraction result: {}", err),
    })
}

/// validate the structured risk result into the tagged status
pub fn parse_risk_assessment(text: &str) -> Result<RiskAssessment> {
    #[derive(Deserialize)]
    struct RawAssessment {
        status: Option<String>,
        #[serde(default)]
        reasoning: Option<String>,
        #[serde(default)]
        tips: Option<Vec<String>>,
    }

    let raw: RawAssessment = serde_json::from_str(if text.trim().is_empty() { "{}" } else { text })
        .map_err(|err| LendingError::RiskAssessment {
            message: format!("unreadable assessment: {}", err),
        })?;

    let status: RiskStatus = raw
        .status
        .as_deref()
        .ok_or_else(|| LendingError::RiskAssessment {
            message: "assessment has no status".to_string(),
        })?
        .parse()?;

    Ok(RiskAssessment {
        status,
        reasoning: raw.reasoning.unwrap_or_default(),
        tips: raw.tips.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoanType;

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            GeminiClient::new(AdvisorConfig::default()),
            Err(LendingError::InvalidConfiguration { .. })
        ));

        let client = GeminiClient::new(AdvisorConfig::with_api_key("test-key")).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_document_request_inlines_image() {
        let request = document_request(b"hello", "image/png");
        let value = serde_json::to_value(&request).unwrap();

        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "aGVsbG8=");
        assert!(parts[1]["text"].as_str().unwrap().contains("paystub"));
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            value["generationConfig"]["responseSchema"]["properties"]["grossPay"]["type"],
            "NUMBER"
        );
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_risk_request_embeds_application() {
        let application = LoanApplication::new(LoanType::Auto);
        let request = risk_request(&application).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        let prompt = value["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("\"loanType\":\"Auto Loan\""));
        assert!(prompt.contains("\"amount\":10000"));
        assert!(!prompt.contains("\"amount\":\"10000\""));
        assert!(prompt.contains("above 45%"));
        assert_eq!(
            value["generationConfig"]["responseSchema"]["properties"]["status"]["enum"],
            json!(["Pre-Qualified", "Needs Review", "Unlikely"])
        );
    }

    #[test]
    fn test_chat_request_replays_history() {
        let mut session = ChatSession::new("be helpful");
        session.record_exchange("hi", "hello!");
        let request = chat_request(&session, "what rates?");
        let value = serde_json::to_value(&request).unwrap();

        let contents = value["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "what rates?");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be helpful");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"status\":"},{"text":"\"Unlikely\"}"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), r#"{"status":"Unlikely"}"#);

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_parse_risk_assessment_validates_status() {
        let ok = parse_risk_assessment(
            r#"{"status":"Needs Review","reasoning":"DTI is 48%","tips":["Pay down cards"]}"#,
        )
        .unwrap();
        assert_eq!(ok.status, RiskStatus::NeedsReview);
        assert_eq!(ok.tips.len(), 1);

        let missing_tips = parse_risk_assessment(r#"{"status":"Pre-Qualified"}"#).unwrap();
        assert!(missing_tips.tips.is_empty());
        assert!(missing_tips.reasoning.is_empty());

        assert!(parse_risk_assessment("").is_err());
        assert!(parse_risk_assessment(r#"{"status":"Medium"}"#).is_err());
        assert!(parse_risk_assessment("not json").is_err());
    }

    #[test]
    fn test_parse_extracted_document() {
        let doc = parse_extracted_document(
            r#"{"employerName":"Acme","period":"Jan 1-14","grossPay":2500.5,"netPay":1900,"confidence":92}"#,
        )
        .unwrap();
        assert_eq!(doc.employer_name.as_deref(), Some("Acme"));
        assert_eq!(doc.gross_pay, Some(2500.5));
        assert_eq!(doc.confidence, Some(92.0));

        assert!(matches!(
            parse_extracted_document(""),
            Err(LendingError::Extraction { .. })
        ));
    }
}
