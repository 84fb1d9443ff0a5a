use analytics_store::{AnalyticsStore, EventStamp, SupplierRow};
use async_trait::async_trait;
use common::EventType;
use domain::{DomainEvent, EventPayload, SupplierPayload};

use crate::Result;
use crate::projector::{EventHandler, Projector, record_affected, record_applied, stamp};

/// Maps a `supplier.created` snapshot to its row.
pub fn supplier_row(
    supplier_id: &str,
    payload: &SupplierPayload,
    stamp: EventStamp,
) -> SupplierRow {
    let contact = &payload.contact_info;
    let company = &payload.company_info;
    let address = &company.business_address;
    let business = &payload.business_info;
    let banking = &payload.banking_info;

    SupplierRow {
        supplier_id: supplier_id.to_string(),
        email: contact.primary_email.clone(),
        phone: contact.primary_phone.clone(),
        contact_person_name: contact.contact_person_name.clone(),
        contact_person_title: contact.contact_person_title.clone(),
        contact_person_email: contact.contact_person_email.clone(),
        contact_person_phone: contact.contact_person_phone.clone(),
        legal_name: company.legal_name.clone(),
        dba_name: company.dba_name.clone(),
        street_address_1: address.street_address_1.clone(),
        street_address_2: address.street_address_2.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip_code: address.zip_code.clone(),
        country: address.country.clone(),
        support_email: business.support_email.clone(),
        support_phone: business.support_phone.clone(),
        facebook_url: business.facebook_url.clone(),
        instagram_handle: business.instagram_handle.clone(),
        twitter_handle: business.twitter_handle.clone(),
        linkedin_url: business.linkedin_url.clone(),
        timezone: business.timezone.clone(),
        bank_name: banking.bank_name.clone(),
        account_holder_name: banking.account_holder_name.clone(),
        account_number_last4: banking.account_number_last4.clone(),
        deleted_at: None,
        created_at: payload.created_at,
        updated_at: payload.updated_at,
        event_id: stamp.event_id,
        event_timestamp: stamp.event_timestamp,
    }
}

/// Projects `supplier.*` events into `suppliers`. Deletion is hard.
pub struct SupplierProjector<S> {
    store: S,
}

impl<S: AnalyticsStore> SupplierProjector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: AnalyticsStore + 'static> EventHandler for SupplierProjector<S> {
    fn name(&self) -> &'static str {
        "SupplierProjector"
    }

    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %event.event_id, entity_id = %event.entity_id)
    )]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match &event.payload {
            EventPayload::SupplierCreated(payload) => {
                let row = supplier_row(event.entity_id.as_str(), payload, stamp(event));
                self.store.upsert_supplier(&row).await?;
            }
            EventPayload::SupplierDeleted(_) => {
                let affected = self.store.delete_supplier(event.entity_id.as_str()).await?;
                record_affected("supplier", event, affected);
            }
            _ => return Err(self.unexpected(event)),
        }
        record_applied("supplier", event);
        Ok(())
    }
}

impl<S: AnalyticsStore + 'static> Projector for SupplierProjector<S> {
    const EVENT_TYPES: &'static [EventType] =
        &[EventType::SupplierCreated, EventType::SupplierDeleted];
}
