//! Domain records decoded from API responses.
//!
//! # Design
//! Records are immutable values decoded once inside a single call — nothing
//! is cached or shared across calls. Each type declares its envelope hooks
//! (`NESTED_OBJECT_KEY`, `ARRAY_KEY`) matching the shape its endpoints
//! return.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::ClientError;
use crate::json::{self, field, FromJson, FromJsonArray, JsonObject};

/// A Monzo account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub created: DateTime<Utc>,
    pub description: String,
}

impl FromJson for Account {
    fn from_json(object: &JsonObject) -> Result<Account, ClientError> {
        Ok(Account {
            id: field(object, "id")?,
            created: json::iso8601_date(object, "created")?,
            description: field(object, "description")?,
        })
    }
}

impl FromJsonArray for Account {
    const ARRAY_KEY: &'static str = "accounts";
}

/// Account balance. Amounts are in minor units and use the full 64-bit
/// range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub balance: i64,
    pub currency: String,
    pub spend_today: i64,
}

impl FromJson for Balance {
    fn from_json(object: &JsonObject) -> Result<Balance, ClientError> {
        Ok(Balance {
            balance: field(object, "balance")?,
            currency: field(object, "currency")?,
            spend_today: field(object, "spend_today")?,
        })
    }
}

/// A transaction on an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub created: DateTime<Utc>,
    pub description: String,
    pub amount: i64,
    pub currency: String,
    pub merchant: String,
    pub notes: String,
    pub metadata: HashMap<String, String>,
    pub account_balance: i64,
    pub category: String,
    pub is_load: bool,
    pub settled: DateTime<Utc>,
    pub local_amount: i64,
    pub local_currency: String,
    pub updated: DateTime<Utc>,
    pub account_id: String,
    pub scheme: String,
    pub dedupe_id: String,
    pub originator: bool,
    pub include_in_spending: bool,
}

impl FromJson for Transaction {
    // GET transactions/{id} wraps the payload; list elements arrive bare.
    const NESTED_OBJECT_KEY: Option<&'static str> = Some("transaction");

    fn from_json(object: &JsonObject) -> Result<Transaction, ClientError> {
        Ok(Transaction {
            id: field(object, "id")?,
            created: json::iso8601_date(object, "created")?,
            description: field(object, "description")?,
            amount: field(object, "amount")?,
            currency: field(object, "currency")?,
            merchant: field(object, "merchant")?,
            notes: field(object, "notes")?,
            metadata: field(object, "metadata")?,
            account_balance: field(object, "account_balance")?,
            category: field(object, "category")?,
            is_load: field(object, "is_load")?,
            settled: json::iso8601_date(object, "settled")?,
            local_amount: field(object, "local_amount")?,
            local_currency: field(object, "local_currency")?,
            updated: json::iso8601_date(object, "updated")?,
            account_id: field(object, "account_id")?,
            scheme: field(object, "scheme")?,
            dedupe_id: field(object, "dedupe_id")?,
            originator: field(object, "originator")?,
            include_in_spending: field(object, "include_in_spending")?,
        })
    }
}

impl FromJsonArray for Transaction {
    const ARRAY_KEY: &'static str = "transactions";
}

/// Lower bound for a transaction listing: a point in time, or the id of the
/// last transaction already seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Since {
    Date(DateTime<Utc>),
    Transaction(String),
}

impl Since {
    pub(crate) fn render(&self) -> String {
        match self {
            Since::Date(date) => json::format_iso8601(*date),
            Since::Transaction(id) => id.clone(),
        }
    }
}

/// A webhook registered on an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub id: String,
    pub account_id: String,
    pub url: String,
}

impl FromJson for Webhook {
    const NESTED_OBJECT_KEY: Option<&'static str> = Some("webhook");

    fn from_json(object: &JsonObject) -> Result<Webhook, ClientError> {
        Ok(Webhook {
            id: field(object, "id")?,
            account_id: field(object, "account_id")?,
            url: field(object, "url")?,
        })
    }
}

impl FromJsonArray for Webhook {
    const ARRAY_KEY: &'static str = "webhooks";
}

/// OAuth credentials returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub client_id: String,
    pub expires_in: u64,
    pub refresh_token: String,
    pub token_type: String,
    pub user_id: String,
}

impl FromJson for Credentials {
    fn from_json(object: &JsonObject) -> Result<Credentials, ClientError> {
        Ok(Credentials {
            access_token: field(object, "access_token")?,
            client_id: field(object, "client_id")?,
            expires_in: field(object, "expires_in")?,
            refresh_token: field(object, "refresh_token")?,
            token_type: field(object, "token_type")?,
            user_id: field(object, "user_id")?,
        })
    }
}

/// What the API knows about the presented access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessTokenInfo {
    NotAuthenticated,
    Authenticated { client_id: String, user_id: String },
}

impl FromJson for AccessTokenInfo {
    fn from_json(object: &JsonObject) -> Result<AccessTokenInfo, ClientError> {
        // The discriminant selects the variant; only the selected variant's
        // fields are required to be present.
        let authenticated: bool = field(object, "authenticated")?;
        if authenticated {
            Ok(AccessTokenInfo::Authenticated {
                client_id: field(object, "client_id")?,
                user_id: field(object, "user_id")?,
            })
        } else {
            Ok(AccessTokenInfo::NotAuthenticated)
        }
    }
}

/// Payload for a feed item. `title` and `image_url` are required by the
/// API; the rest are optional presentation tweaks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub image_url: String,
    pub url: Option<String>,
    pub body: Option<String>,
    pub background_color: Option<String>,
    pub body_color: Option<String>,
    pub title_color: Option<String>,
}
