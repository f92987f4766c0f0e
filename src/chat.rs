use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::ai::ConversationalAdvisor;
use crate::config::{AdvisorConfig, ADVISOR_GREETING, ADVISOR_SYSTEM_INSTRUCTION};
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::types::ChatRole;

pub const EMPTY_REPLY_TEXT: &str = "I'm having trouble understanding right now. Please try again.";

/// one turn of conversation history sent back to the advisor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// advisor conversation state, alive only while the widget is open
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    system_instruction: String,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            system_instruction: system_instruction.into(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// append a completed user/model exchange
    pub fn record_exchange(&mut self, user_text: &str, reply: &str) {
        self.history.push(ChatTurn {
            role: ChatRole::User,
            text: user_text.to_string(),
        });
        self.history.push(ChatTurn {
            role: ChatRole::Model,
            text: reply.to_string(),
        });
    }
}

/// a message in the visible transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// floating advisor chat widget
pub struct AdvisorChat {
    time: Arc<SafeTimeProvider>,
    greeting: String,
    system_instruction: String,
    session: Option<ChatSession>,
    messages: Vec<ChatMessage>,
    pub events: EventStore,
}

impl AdvisorChat {
    pub fn new(time: Arc<SafeTimeProvider>) -> Self {
        Self {
            time,
            greeting: ADVISOR_GREETING.to_string(),
            system_instruction: ADVISOR_SYSTEM_INSTRUCTION.to_string(),
            session: None,
            messages: Vec::new(),
            events: EventStore::new(),
        }
    }

    /// widget on wall-clock time using the configured greeting and instruction
    pub fn with_config(config: &AdvisorConfig) -> Self {
        let mut chat = Self::new(Arc::new(SafeTimeProvider::new(TimeSource::System)));
        chat.greeting = config.greeting.clone();
        chat.system_instruction = config.system_instruction.clone();
        chat
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// open the widget, starting a session seeded with the greeting
    ///
    /// Opening an already open widget keeps the current session.
    pub fn open(&mut self) -> &ChatSession {
        if self.session.is_none() {
            self.messages.clear();
            self.events.emit(Event::ChatOpened {
                timestamp: self.time.now(),
            });
            let greeting = self.greeting.clone();
            self.push_message(ChatRole::Model, greeting, false);
        }
        let instruction = &self.system_instruction;
        self.session.get_or_insert_with(|| {
            let session = ChatSession::new(instruction.clone());
            log::info!("advisor chat session {} opened", session.id());
            session
        })
    }

    /// close the widget, dropping the session and its transcript
    pub fn close(&mut self) -> Option<ChatSession> {
        let session = self.session.take();
        if let Some(session) = &session {
            log::info!("advisor chat session {} closed", session.id());
            self.messages.clear();
            self.events.emit(Event::ChatClosed {
                timestamp: self.time.now(),
            });
        }
        session
    }

    /// send user text and append the advisor's reply
    ///
    /// Blank input is ignored and returns `Ok(None)`. A failed call still
    /// appends a reply: the connection apology shown inline.
    pub async fn send(
        &mut self,
        advisor: &dyn ConversationalAdvisor,
        text: &str,
    ) -> Result<Option<ChatMessage>> {
        if self.session.is_none() {
            return Err(LendingError::ChatClosed);
        }
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.push_message(ChatRole::User, text.to_string(), false);

        let session = self.session.as_mut().ok_or(LendingError::ChatClosed)?;
        let (reply, fallback) = match advisor.send_message(session, text).await {
            Ok(reply) if reply.trim().is_empty() => (EMPTY_REPLY_TEXT.to_string(), true),
            Ok(reply) => (reply, false),
            Err(err) => {
                log::warn!("advisor chat failed: {}", err);
                (err.user_message(), true)
            }
        };

        Ok(Some(self.push_message(ChatRole::Model, reply, fallback)))
    }

    fn push_message(&mut self, role: ChatRole, text: String, fallback: bool) -> ChatMessage {
        let timestamp = self.time.now();
        let message = ChatMessage {
            id: Uuid::new_v4(),
            role,
            text,
            timestamp,
        };
        self.messages.push(message.clone());
        self.events.emit(Event::ChatMessageAdded {
            role,
            fallback,
            timestamp,
        });
        message
    }
}
