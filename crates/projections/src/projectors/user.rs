use analytics_store::{AnalyticsStore, EventStamp, UserRow};
use async_trait::async_trait;
use common::EventType;
use domain::{DeletionPayload, DomainEvent, EventPayload, UserPayload};

use crate::Result;
use crate::projector::{
    EventHandler, Projector, deletion_time, record_affected, record_applied, stamp,
};

/// Maps a `user.created` snapshot to its row.
pub fn user_row(user_id: &str, payload: &UserPayload, stamp: EventStamp) -> UserRow {
    UserRow {
        user_id: user_id.to_string(),
        email: payload.contact_info.primary_email.clone(),
        phone: payload.contact_info.phone.clone(),
        display_name: payload.profile.display_name.clone(),
        avatar: payload.profile.avatar.clone(),
        bio: payload.profile.bio.clone(),
        version: payload.version,
        deleted_at: payload.deleted_at,
        created_at: payload.created_at,
        updated_at: payload.updated_at,
        event_id: stamp.event_id,
        event_timestamp: stamp.event_timestamp,
    }
}

/// Projects `user.*` events into `users`. Deletion is soft.
pub struct UserProjector<S> {
    store: S,
}

impl<S: AnalyticsStore> UserProjector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn on_created(&self, event: &DomainEvent, payload: &UserPayload) -> Result<()> {
        let row = user_row(event.entity_id.as_str(), payload, stamp(event));
        self.store.upsert_user(&row).await?;
        Ok(())
    }

    async fn on_deleted(&self, event: &DomainEvent, payload: &DeletionPayload) -> Result<()> {
        let affected = self
            .store
            .soft_delete_user(
                event.entity_id.as_str(),
                deletion_time(event, payload),
                &stamp(event),
            )
            .await?;
        record_affected("user", event, affected);
        Ok(())
    }
}

#[async_trait]
impl<S: AnalyticsStore + 'static> EventHandler for UserProjector<S> {
    fn name(&self) -> &'static str {
        "UserProjector"
    }

    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %event.event_id, entity_id = %event.entity_id)
    )]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match &event.payload {
            EventPayload::UserCreated(payload) => self.on_created(event, payload).await?,
            EventPayload::UserDeleted(payload) => self.on_deleted(event, payload).await?,
            _ => return Err(self.unexpected(event)),
        }
        record_applied("user", event);
        Ok(())
    }
}

impl<S: AnalyticsStore + 'static> Projector for UserProjector<S> {
    const EVENT_TYPES: &'static [EventType] = &[EventType::UserCreated, EventType::UserDeleted];
}
