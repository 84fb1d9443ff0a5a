//! `supplier.*` payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Snapshot carried by `supplier.created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_info: SupplierContactInfo,

    #[serde(default, deserialize_with = "null_as_default")]
    pub company_info: CompanyInfo,

    #[serde(default, deserialize_with = "null_as_default")]
    pub business_info: BusinessInfo,

    #[serde(default, deserialize_with = "null_as_default")]
    pub banking_info: BankingInfo,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierContactInfo {
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub primary_phone: Option<String>,
    #[serde(default)]
    pub contact_person_name: Option<String>,
    #[serde(default)]
    pub contact_person_title: Option<String>,
    #[serde(default)]
    pub contact_person_email: Option<String>,
    #[serde(default)]
    pub contact_person_phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub dba_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_address: CompanyAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyAddress {
    #[serde(default)]
    pub street_address_1: Option<String>,
    #[serde(default)]
    pub street_address_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(default)]
    pub support_email: Option<String>,
    #[serde(default)]
    pub support_phone: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub twitter_handle: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// IANA timezone name.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Payout details. Only the last four digits of the account number ever leave the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankingInfo {
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_holder_name: Option<String>,
    #[serde(default)]
    pub account_number_last4: Option<String>,
}
