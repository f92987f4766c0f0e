use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::ai::{DocumentExtractor, RiskAssessor};
use crate::application::{ApplicationField, FieldValue, LoanApplication};
use crate::config::{LendFlowConfig, DEFAULT_PAY_PERIODS_PER_YEAR};
use crate::documents::{self, AppliedDocument, DocumentUpload};
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::types::{ExtractedDocument, LoanType, RiskAssessment};

/// wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    PersonalInfo,
    Financials,
    LoanDetails,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::PersonalInfo,
        WizardStep::Financials,
        WizardStep::LoanDetails,
        WizardStep::Review,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::PersonalInfo => "Personal Info",
            WizardStep::Financials => "Financials",
            WizardStep::LoanDetails => "Loan Details",
            WizardStep::Review => "Review",
        }
    }

    /// following step, clamped at review
    pub fn next(&self) -> WizardStep {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    /// preceding step, clamped at the first
    pub fn previous(&self) -> WizardStep {
        Self::ALL[self.index().saturating_sub(1)]
    }

    pub fn is_first(&self) -> bool {
        *self == WizardStep::PersonalInfo
    }

    pub fn is_last(&self) -> bool {
        *self == WizardStep::Review
    }
}

/// multi-step loan application flow
///
/// The wizard exclusively owns its draft. Every change is recorded in
/// `events` so a view can re-render from the log instead of polling.
pub struct ApplicationWizard {
    session_id: Uuid,
    step: WizardStep,
    draft: LoanApplication,
    risk_assessment: Option<RiskAssessment>,
    pay_periods_per_year: u32,
    time: Arc<SafeTimeProvider>,
    pub events: EventStore,
}

impl ApplicationWizard {
    /// open a wizard with an empty draft, preselecting `initial_loan_type`
    pub fn open(initial_loan_type: Option<LoanType>, time: Arc<SafeTimeProvider>) -> Self {
        let session_id = Uuid::new_v4();
        let mut events = EventStore::new();
        events.emit(Event::WizardOpened {
            session_id,
            timestamp: time.now(),
        });
        log::info!("application wizard {} opened", session_id);

        Self {
            session_id,
            step: WizardStep::PersonalInfo,
            draft: LoanApplication::new(initial_loan_type.unwrap_or_default()),
            risk_assessment: None,
            pay_periods_per_year: DEFAULT_PAY_PERIODS_PER_YEAR,
            time,
            events,
        }
    }

    /// open on wall-clock time with settings from `config`
    pub fn with_config(initial_loan_type: Option<LoanType>, config: &LendFlowConfig) -> Self {
        let time = Arc::new(SafeTimeProvider::new(TimeSource::System));
        Self::open(initial_loan_type, time).with_pay_periods(config.documents.pay_periods_per_year)
    }

    /// periods used to annualize extracted gross pay
    pub fn with_pay_periods(mut self, periods: u32) -> Self {
        self.pay_periods_per_year = periods.max(1);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &LoanApplication {
        &self.draft
    }

    pub fn risk_assessment(&self) -> Option<&RiskAssessment> {
        self.risk_assessment.as_ref()
    }

    /// fraction of the flow reached, for the progress bar
    pub fn progress(&self) -> f64 {
        (self.step.index() + 1) as f64 / WizardStep::ALL.len() as f64
    }

    pub fn can_go_back(&self) -> bool {
        !self.step.is_first()
    }

    pub fn is_last_step(&self) -> bool {
        self.step.is_last()
    }

    /// advance one step
    ///
    /// Leaving loan details runs the risk assessor exactly once and keeps its
    /// result for review; a failed assessment stores the fallback result and
    /// the flow still advances. On the review step this is a no-op.
    pub async fn next(&mut self, assessor: &dyn RiskAssessor) -> WizardStep {
        if self.step.is_last() {
            return self.step;
        }

        if self.step == WizardStep::LoanDetails {
            let (assessment, fallback) = match assessor.assess(&self.draft).await {
                Ok(assessment) => (assessment, false),
                Err(err) => {
                    log::warn!("risk assessment failed for wizard {}: {}", self.session_id, err);
                    (RiskAssessment::fallback(), true)
                }
            };
            log::debug!("wizard {} assessed as {}", self.session_id, assessment.status);
            self.events.emit(Event::RiskAssessed {
                status: assessment.status,
                fallback,
                timestamp: self.time.now(),
            });
            self.risk_assessment = Some(assessment);
        }

        let from = self.step;
        self.step = from.next();
        self.events.emit(Event::StepAdvanced {
            from,
            to: self.step,
            timestamp: self.time.now(),
        });
        self.step
    }

    /// retreat one step, no-op on the first step
    pub fn back(&mut self) -> WizardStep {
        if self.step.is_first() {
            return self.step;
        }
        let from = self.step;
        self.step = from.previous();
        self.events.emit(Event::StepRetreated {
            from,
            to: self.step,
            timestamp: self.time.now(),
        });
        self.step
    }

    /// demo submit: records the request, never moves the flow
    ///
    /// Returns false when called before the review step.
    pub fn submit(&mut self) -> bool {
        if !self.step.is_last() {
            return false;
        }
        log::info!(
            "application submitted (demo) for {} by wizard {}",
            self.draft.loan_type,
            self.session_id
        );
        self.events.emit(Event::ApplicationSubmitted {
            session_id: self.session_id,
            timestamp: self.time.now(),
        });
        true
    }

    /// close the wizard, discarding the draft
    pub fn close(self) {
        log::info!("application wizard {} closed", self.session_id);
    }

    pub fn update_field(&mut self, field: ApplicationField, value: impl Into<FieldValue>) -> Result<()> {
        self.draft.set_field(field, value.into())?;
        self.field_updated(field);
        Ok(())
    }

    /// form entry point: field by wire name, value as typed
    pub fn update_field_from_input(&mut self, name: &str, raw: &str) -> Result<ApplicationField> {
        let field = self.draft.set_field_from_input(name, raw)?;
        self.field_updated(field);
        Ok(field)
    }

    /// apply an extraction result to the draft
    pub fn apply_extracted_document(&mut self, document: &ExtractedDocument) -> AppliedDocument {
        let applied = documents::apply_to_application(document, &mut self.draft, self.pay_periods_per_year);
        self.events.emit(Event::DocumentApplied {
            employer_updated: applied.employer_updated,
            income_updated: applied.income_updated,
            timestamp: self.time.now(),
        });
        applied
    }

    /// validate, analyze and apply an uploaded paystub
    ///
    /// Unsupported media types are refused before any call. Extraction
    /// failures leave the draft unchanged; `user_message()` on the error is
    /// the inline text to show.
    pub async fn analyze_document(
        &mut self,
        extractor: &dyn DocumentExtractor,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ExtractedDocument> {
        let upload = match DocumentUpload::new(file_name, mime_type, bytes) {
            Ok(upload) => upload,
            Err(err) => {
                self.events.emit(Event::UploadRejected {
                    mime_type: mime_type.to_string(),
                    timestamp: self.time.now(),
                });
                return Err(err);
            }
        };

        let document = extractor
            .analyze(&upload.bytes, &upload.mime_type)
            .await
            .map_err(|err| {
                log::warn!("document analysis of {} failed: {}", upload.file_name, err);
                match err {
                    LendingError::Extraction { .. } => err,
                    other => LendingError::Extraction {
                        message: other.to_string(),
                    },
                }
            })?;

        self.apply_extracted_document(&document);
        Ok(document)
    }

    fn field_updated(&mut self, field: ApplicationField) {
        self.events.emit(Event::FieldUpdated {
            field,
            timestamp: self.time.now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::types::RiskStatus;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAssessor {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingAssessor {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RiskAssessor for CountingAssessor {
        async fn assess(&self, application: &LoanApplication) -> Result<RiskAssessment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LendingError::RiskAssessment {
                    message: "service unavailable".to_string(),
                });
            }
            Ok(RiskAssessment {
                status: RiskStatus::PreQualified,
                reasoning: format!("{} looks fine", application.applicant_name()),
                tips: vec!["Keep debt low".to_string()],
            })
        }
    }

    struct FixedExtractor(Result<ExtractedDocument>);

    #[async_trait]
    impl DocumentExtractor for FixedExtractor {
        async fn analyze(&self, _image: &[u8], _mime_type: &str) -> Result<ExtractedDocument> {
            match &self.0 {
                Ok(doc) => Ok(doc.clone()),
                Err(_) => Err(LendingError::Extraction {
                    message: "No data returned".to_string(),
                }),
            }
        }
    }

    fn test_wizard() -> ApplicationWizard {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        ApplicationWizard::open(None, Arc::new(time))
    }

    #[test]
    fn test_step_navigation_is_clamped() {
        assert_eq!(WizardStep::Review.next(), WizardStep::Review);
        assert_eq!(WizardStep::PersonalInfo.previous(), WizardStep::PersonalInfo);
        assert_eq!(WizardStep::Financials.next(), WizardStep::LoanDetails);
        assert_eq!(WizardStep::LoanDetails.previous(), WizardStep::Financials);
    }

    #[test]
    fn test_back_from_first_step_is_noop() {
        let mut wizard = test_wizard();
        let events_before = wizard.events.events().len();

        assert_eq!(wizard.back(), WizardStep::PersonalInfo);
        assert!(!wizard.can_go_back());
        assert_eq!(wizard.events.events().len(), events_before);
    }

    #[tokio::test]
    async fn test_full_flow_calls_assessor_once() {
        let mut wizard = test_wizard();
        let assessor = CountingAssessor::new(false);

        assert_eq!(wizard.next(&assessor).await, WizardStep::Financials);
        assert_eq!(wizard.next(&assessor).await, WizardStep::LoanDetails);
        assert_eq!(assessor.calls(), 0);
        assert!(wizard.risk_assessment().is_none());

        assert_eq!(wizard.next(&assessor).await, WizardStep::Review);
        assert_eq!(assessor.calls(), 1);
        assert_eq!(wizard.risk_assessment().unwrap().status, RiskStatus::PreQualified);

        // next on review is a no-op and does not reassess
        assert_eq!(wizard.next(&assessor).await, WizardStep::Review);
        assert_eq!(assessor.calls(), 1);
        assert!(wizard.is_last_step());
        assert_eq!(wizard.progress(), 1.0);
    }

    #[tokio::test]
    async fn test_each_forward_transition_reassesses() {
        let mut wizard = test_wizard();
        let assessor = CountingAssessor::new(false);

        for _ in 0..3 {
            wizard.next(&assessor).await;
        }
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::LoanDetails);
        wizard.next(&assessor).await;

        assert_eq!(assessor.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_assessment_stores_fallback() {
        let mut wizard = test_wizard();
        let assessor = CountingAssessor::new(true);

        for _ in 0..3 {
            wizard.next(&assessor).await;
        }

        assert_eq!(wizard.step(), WizardStep::Review);
        let stored = wizard.risk_assessment().unwrap();
        assert_eq!(stored, &RiskAssessment::fallback());
        assert!(wizard.events.events().iter().any(|e| matches!(
            e,
            Event::RiskAssessed { fallback: true, .. }
        )));
    }

    #[tokio::test]
    async fn test_submit_does_not_transition() {
        let mut wizard = test_wizard();
        assert!(!wizard.submit());

        let assessor = CountingAssessor::new(false);
        for _ in 0..3 {
            wizard.next(&assessor).await;
        }
        assert!(wizard.submit());
        assert_eq!(wizard.step(), WizardStep::Review);
        assert!(matches!(
            wizard.events.events().last(),
            Some(Event::ApplicationSubmitted { .. })
        ));
        wizard.close();
    }

    #[test]
    fn test_field_updates_recorded() {
        let mut wizard = test_wizard();
        wizard.update_field(ApplicationField::FirstName, "Jane").unwrap();
        wizard.update_field_from_input("monthlyDebt", "450").unwrap();

        assert_eq!(wizard.draft().first_name, "Jane");
        assert_eq!(wizard.draft().monthly_debt, Money::from_major(450));
        let updates = wizard
            .events
            .events()
            .iter()
            .filter(|e| matches!(e, Event::FieldUpdated { .. }))
            .count();
        assert_eq!(updates, 2);

        assert!(wizard.update_field_from_input("creditScoreEst", "great").is_err());
        assert_eq!(wizard.draft().credit_score_estimate, 700);
    }

    #[test]
    fn test_initial_loan_type_preselected() {
        let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )));
        let wizard = ApplicationWizard::open(Some(LoanType::Mortgage), time);
        assert_eq!(wizard.draft().loan_type, LoanType::Mortgage);
        assert_eq!(wizard.progress(), 0.25);
    }

    #[tokio::test]
    async fn test_document_income_annualized() {
        let mut wizard = test_wizard();
        let extractor = FixedExtractor(Ok(ExtractedDocument {
            employer_name: Some("Acme Corp".to_string()),
            gross_pay: Some(1000.0),
            ..Default::default()
        }));

        let doc = wizard
            .analyze_document(&extractor, "stub.png", "image/png", vec![0x89, 0x50])
            .await
            .unwrap();

        assert_eq!(doc.gross_pay, Some(1000.0));
        assert_eq!(wizard.draft().annual_income, Money::from_major(26_000));
        assert_eq!(wizard.draft().employer_name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_unsupported_upload_changes_nothing() {
        let mut wizard = test_wizard();
        let extractor = FixedExtractor(Ok(ExtractedDocument {
            gross_pay: Some(1000.0),
            ..Default::default()
        }));
        let before = wizard.draft().clone();

        let err = wizard
            .analyze_document(&extractor, "stub.pdf", "application/pdf", vec![1])
            .await
            .unwrap_err();

        assert!(matches!(err, LendingError::UnsupportedUpload { .. }));
        assert_eq!(wizard.draft(), &before);
        assert!(matches!(
            wizard.events.events().last(),
            Some(Event::UploadRejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_extraction_failure_leaves_draft() {
        let mut wizard = test_wizard();
        let extractor = FixedExtractor(Err(LendingError::Extraction {
            message: String::new(),
        }));
        let before = wizard.draft().clone();

        let err = wizard
            .analyze_document(&extractor, "stub.jpg", "image/jpeg", vec![1])
            .await
            .unwrap_err();

        assert_eq!(
            err.user_message(),
            "AI Analysis failed. Please try again or enter details manually."
        );
        assert_eq!(wizard.draft(), &before);
    }

    #[tokio::test]
    async fn test_configured_pay_periods() {
        let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )));
        let mut wizard = ApplicationWizard::open(None, time).with_pay_periods(24);
        wizard.apply_extracted_document(&ExtractedDocument {
            gross_pay: Some(1000.0),
            ..Default::default()
        });
        assert_eq!(wizard.draft().annual_income, Money::from_major(24_000));
    }
}
