use analytics_store::{AnalyticsStore, EventStamp, PostRow};
use async_trait::async_trait;
use common::EventType;
use domain::{DeletionPayload, DomainEvent, EventPayload, PostPayload};
use serde_json::Value;

use crate::Result;
use crate::projector::{
    EventHandler, Projector, deletion_time, record_affected, record_applied, stamp,
};

/// Maps a post snapshot to its row.
pub fn post_row(post_id: &str, payload: &PostPayload, stamp: EventStamp) -> PostRow {
    let author = &payload.author;
    let link = payload.link_preview.clone().unwrap_or_default();
    let stats = &payload.stats;

    PostRow {
        post_id: post_id.to_string(),
        post_type: payload.post_type.clone(),
        author_user_id: author.user_id.clone(),
        author_display_name: author.display_name.clone(),
        author_avatar: author.avatar.clone(),
        author_type: author.author_type.clone(),
        text_content: payload.text_content.clone(),
        media: Value::Array(payload.media.clone()),
        link_url: link.url,
        link_title: link.title,
        link_description: link.description,
        link_image: link.image,
        link_site_name: link.site_name,
        view_count: stats.view_count,
        like_count: stats.like_count,
        comment_count: stats.comment_count,
        share_count: stats.share_count,
        save_count: stats.save_count,
        engagement_rate: stats.engagement_rate,
        last_comment_at: stats.last_comment_at,
        published_at: payload.published_at,
        deleted_at: payload.deleted_at,
        created_at: payload.created_at,
        updated_at: payload.updated_at,
        event_id: stamp.event_id,
        event_timestamp: stamp.event_timestamp,
    }
}

/// Projects `post.*` events into `posts`. Deletion is soft.
pub struct PostProjector<S> {
    store: S,
}

impl<S: AnalyticsStore> PostProjector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn on_snapshot(&self, event: &DomainEvent, payload: &PostPayload) -> Result<()> {
        let row = post_row(event.entity_id.as_str(), payload, stamp(event));
        self.store.upsert_post(&row).await?;
        Ok(())
    }

    async fn on_deleted(&self, event: &DomainEvent, payload: &DeletionPayload) -> Result<()> {
        let affected = self
            .store
            .soft_delete_post(
                event.entity_id.as_str(),
                deletion_time(event, payload),
                &stamp(event),
            )
            .await?;
        record_affected("post", event, affected);
        Ok(())
    }
}

#[async_trait]
impl<S: AnalyticsStore + 'static> EventHandler for PostProjector<S> {
    fn name(&self) -> &'static str {
        "PostProjector"
    }

    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %event.event_id, entity_id = %event.entity_id)
    )]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match &event.payload {
            EventPayload::PostCreated(payload) | EventPayload::PostPublished(payload) => {
                self.on_snapshot(event, payload).await?
            }
            EventPayload::PostDeleted(payload) => self.on_deleted(event, payload).await?,
            _ => return Err(self.unexpected(event)),
        }
        record_applied("post", event);
        Ok(())
    }
}

impl<S: AnalyticsStore + 'static> Projector for PostProjector<S> {
    const EVENT_TYPES: &'static [EventType] = &[
        EventType::PostCreated,
        EventType::PostPublished,
        EventType::PostDeleted,
    ];
}
