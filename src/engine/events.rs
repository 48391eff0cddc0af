//! Event lifecycle, gated on admin profiles.
//!
//! Transitions are forward-only and race through the store's
//! compare-and-set, so two admins pressing buttons at once cannot move an
//! event backwards or resurrect a terminal one. Cancelling freezes the
//! aggregates where they stand; no vote on a cancelled event is ever
//! scored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::database::{EventChanges, Store};
use crate::error::EngineError;
use crate::model::{Event, EventStatus, Profile};

/// Input for event creation. Events start in `draft` unless `activate` is
/// set, in which case they open for voting immediately.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub resolution_date: Option<DateTime<Utc>>,
    pub activate: bool,
}

pub struct EventManager {
    store: Arc<dyn Store>,
}

impl EventManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_admin(&self, user_id: &str) -> Result<Profile, EngineError> {
        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or(EngineError::NotAuthorized)?;
        if !profile.is_admin {
            return Err(EngineError::NotAuthorized);
        }
        Ok(profile)
    }

    pub async fn create_event(&self, actor: &str, new: NewEvent) -> Result<Event, EngineError> {
        self.require_admin(actor).await?;

        let title = new.title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation("title is required".to_string()));
        }
        if new.deadline <= Utc::now() {
            return Err(EngineError::Validation(
                "deadline must be in the future".to_string(),
            ));
        }

        let event = Event {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: new.description,
            deadline: new.deadline,
            resolution_date: new.resolution_date,
            status: if new.activate {
                EventStatus::Active
            } else {
                EventStatus::Draft
            },
            outcome: None,
            yes_count: 0,
            no_count: 0,
            weighted_yes: 0.0,
            weighted_no: 0.0,
            created_by: Some(actor.to_string()),
            settled_by: None,
            settled_at: None,
            created_at: Utc::now(),
        };

        self.store.insert_event(&event).await?;
        info!(event_id = %event.id, title = %event.title, "Event created");
        Ok(event)
    }

    pub async fn update_event(
        &self,
        actor: &str,
        event_id: Uuid,
        changes: EventChanges,
    ) -> Result<Event, EngineError> {
        self.require_admin(actor).await?;

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(EngineError::EventNotFound)?;
        if !matches!(event.status, EventStatus::Draft | EventStatus::Active) {
            return Err(EngineError::Validation(
                "only draft or active events can be edited".to_string(),
            ));
        }
        if let Some(title) = &changes.title {
            if title.trim().is_empty() {
                return Err(EngineError::Validation("title is required".to_string()));
            }
        }

        self.store.update_event_details(event_id, &changes).await?;
        self.get_event(event_id).await
    }

    /// Open a draft event for voting.
    pub async fn activate(&self, actor: &str, event_id: Uuid) -> Result<Event, EngineError> {
        self.transition(actor, event_id, &[EventStatus::Draft], EventStatus::Active)
            .await
    }

    /// Stop accepting votes; the event becomes eligible for settlement.
    pub async fn close(&self, actor: &str, event_id: Uuid) -> Result<Event, EngineError> {
        self.transition(actor, event_id, &[EventStatus::Active], EventStatus::Closed)
            .await
    }

    /// Cancel a non-terminal event. Aggregates freeze as-is; votes are
    /// never scored and nobody's trust moves.
    pub async fn cancel(&self, actor: &str, event_id: Uuid) -> Result<Event, EngineError> {
        self.transition(
            actor,
            event_id,
            &[EventStatus::Draft, EventStatus::Active, EventStatus::Closed],
            EventStatus::Cancelled,
        )
        .await
    }

    async fn transition(
        &self,
        actor: &str,
        event_id: Uuid,
        from: &[EventStatus],
        to: EventStatus,
    ) -> Result<Event, EngineError> {
        self.require_admin(actor).await?;

        match self.store.transition_status(event_id, from, to).await {
            Ok(true) => {
                let event = self.get_event(event_id).await?;
                info!(event_id = %event_id, status = event.status.as_str(), "Event transitioned");
                Ok(event)
            }
            // Lost the race or asked for an illegal move; report where the
            // event actually is.
            Ok(false) => {
                let event = self.get_event(event_id).await?;
                Err(EngineError::InvalidTransition {
                    from: event.status.as_str(),
                })
            }
            Err(crate::error::StoreError::NotFound) => Err(EngineError::EventNotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Event, EngineError> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or(EngineError::EventNotFound)
    }

    pub async fn list_events(
        &self,
        status: Option<EventStatus>,
    ) -> Result<Vec<Event>, EngineError> {
        Ok(self.store.list_events(status).await?)
    }
}
