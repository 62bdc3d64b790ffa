//! Per-turn analytics emission for the external analytics collaborator.
//! The engine emits; it never aggregates.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::session::{SessionId, SessionState};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_id: String,
    pub session_id: SessionId,
    pub turn: u32,
    pub score_delta: i32,
    pub resulting_score: u8,
    pub state: SessionState,
    pub occurred_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(
        session_id: SessionId,
        turn: u32,
        score_delta: i32,
        resulting_score: u8,
        state: SessionState,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            session_id,
            turn,
            score_delta,
            resulting_score,
            state,
            occurred_at: Utc::now(),
        }
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: AnalyticsEvent);
}

#[derive(Clone, Default)]
pub struct InMemoryAnalyticsSink {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl InMemoryAnalyticsSink {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AnalyticsSink for InMemoryAnalyticsSink {
    fn emit(&self, event: AnalyticsEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
