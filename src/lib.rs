pub mod ai;
pub mod application;
pub mod chat;
pub mod config;
pub mod decimal;
pub mod documents;
pub mod errors;
pub mod events;
pub mod payments;
pub mod products;
pub mod types;
pub mod wizard;

// re-export key types
pub use ai::{ConversationalAdvisor, DocumentExtractor, GeminiClient, OfflineAdvisor, RiskAssessor};
pub use application::{ApplicationField, FieldValue, LoanApplication};
pub use chat::{AdvisorChat, ChatMessage, ChatSession, ChatTurn};
pub use config::{AdvisorConfig, CalculatorBounds, DocumentConfig, LendFlowConfig, SliderRange};
pub use decimal::{Money, Rate};
pub use documents::{AppliedDocument, DocumentUpload};
pub use errors::{LendingError, Result};
pub use events::{Event, EventStore};
pub use payments::{
    AmortizationCalculator, AmortizationSchedule, PaymentEstimate, PaymentEstimator,
    ScheduledPayment,
};
pub use products::LoanProduct;
pub use types::{ChatRole, ExtractedDocument, LoanType, RiskAssessment, RiskStatus};
pub use wizard::{ApplicationWizard, WizardStep};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
