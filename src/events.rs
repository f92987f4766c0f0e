use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ApplicationField;
use crate::types::{ChatRole, RiskStatus};
use crate::wizard::WizardStep;

/// all events that can be emitted by a wizard session or chat widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // wizard events
    WizardOpened {
        session_id: uuid::Uuid,
        timestamp: DateTime<Utc>,
    },
    StepAdvanced {
        from: WizardStep,
        to: WizardStep,
        timestamp: DateTime<Utc>,
    },
    StepRetreated {
        from: WizardStep,
        to: WizardStep,
        timestamp: DateTime<Utc>,
    },
    FieldUpdated {
        field: ApplicationField,
        timestamp: DateTime<Utc>,
    },
    ApplicationSubmitted {
        session_id: uuid::Uuid,
        timestamp: DateTime<Utc>,
    },

    // ai events
    RiskAssessed {
        status: RiskStatus,
        fallback: bool,
        timestamp: DateTime<Utc>,
    },
    DocumentApplied {
        employer_updated: bool,
        income_updated: bool,
        timestamp: DateTime<Utc>,
    },
    UploadRejected {
        mime_type: String,
        timestamp: DateTime<Utc>,
    },

    // chat events
    ChatOpened {
        timestamp: DateTime<Utc>,
    },
    ChatMessageAdded {
        role: ChatRole,
        fallback: bool,
        timestamp: DateTime<Utc>,
    },
    ChatClosed {
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_take_events_drains() {
        let mut store = EventStore::new();
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        store.emit(Event::ChatOpened { timestamp });
        store.emit(Event::ChatClosed { timestamp });

        assert_eq!(store.events().len(), 2);
        let taken = store.take_events();
        assert_eq!(taken.len(), 2);
        assert!(store.events().is_empty());
    }
}
