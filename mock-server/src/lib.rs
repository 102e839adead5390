//! In-memory emulation of the Monzo API surface, used by the core crate's
//! integration tests and runnable standalone.
//!
//! # Design
//! Fixture data (one account, one transaction) is seeded at startup;
//! webhooks and transaction annotations live behind `Arc<RwLock<..>>`.
//! Protected routes require the fixture bearer token and reply 401
//! otherwise, so clients can exercise their credential-failure path.
//! Form bodies use the bracketed-key convention the real API accepts
//! (`params[title]`, `metadata[k]`).

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The only access token the server accepts.
pub const ACCESS_TOKEN: &str = "access_token_xyz";
pub const CLIENT_ID: &str = "client_abc";
pub const USER_ID: &str = "user_00009238aMBIIrS5Rdncq9";
pub const REFRESH_TOKEN: &str = "refresh_token_xyz";
pub const ACCOUNT_ID: &str = "acc_00009237aqC8c5umZmrRdh";
pub const TRANSACTION_ID: &str = "tx_00008zIcpb1TB4yeIFXMzx";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub account_id: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub created: String,
    pub description: String,
    pub amount: i64,
    pub currency: String,
    pub merchant: String,
    pub notes: String,
    pub metadata: HashMap<String, String>,
    pub account_balance: i64,
    pub category: String,
    pub is_load: bool,
    pub settled: String,
    pub local_amount: i64,
    pub local_currency: String,
    pub updated: String,
    pub account_id: String,
    pub scheme: String,
    pub dedupe_id: String,
    pub originator: bool,
    pub include_in_spending: bool,
}

/// The fixture transaction every fresh server starts with.
pub fn sample_transaction() -> Transaction {
    Transaction {
        id: TRANSACTION_ID.to_owned(),
        created: "2015-08-22T12:20:18.095Z".to_owned(),
        description: "Initial top up".to_owned(),
        amount: -510,
        currency: "GBP".to_owned(),
        merchant: "merch_00008zIcpbAKe8shBxXUtl".to_owned(),
        notes: "salmon sandwich".to_owned(),
        metadata: HashMap::new(),
        account_balance: 13013,
        category: "eating_out".to_owned(),
        is_load: false,
        settled: "2015-08-23T12:20:18.095Z".to_owned(),
        local_amount: -510,
        local_currency: "GBP".to_owned(),
        updated: "2015-08-22T12:20:18.095Z".to_owned(),
        account_id: ACCOUNT_ID.to_owned(),
        scheme: "gps_mastercard".to_owned(),
        dedupe_id: "a_dedupe_id".to_owned(),
        originator: false,
        include_in_spending: true,
    }
}

#[derive(Default)]
pub struct ServerState {
    pub transactions: HashMap<String, Transaction>,
    pub webhooks: HashMap<String, Webhook>,
}

pub type Db = Arc<RwLock<ServerState>>;

pub fn app() -> Router {
    let mut state = ServerState::default();
    let transaction = sample_transaction();
    state.transactions.insert(transaction.id.clone(), transaction);
    let db: Db = Arc::new(RwLock::new(state));

    Router::new()
        .route("/ping", get(ping))
        .route("/ping/whoami", get(whoami))
        .route("/oauth2/token", post(token))
        .route("/accounts", get(accounts))
        .route("/balance", get(balance))
        .route("/transactions", get(list_transactions))
        .route("/transactions/{id}", get(get_transaction).patch(annotate_transaction))
        .route("/feed", post(create_feed_item))
        .route("/webhooks", post(create_webhook).get(list_webhooks))
        .route("/webhooks/{id}", delete(delete_webhook))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authorize(headers: &HeaderMap) -> Result<(), StatusCode> {
    match bearer(headers) {
        Some(token) if token == ACCESS_TOKEN => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn ping() -> Json<Value> {
    Json(json!({"ping": "pong"}))
}

async fn whoami(headers: HeaderMap) -> Json<Value> {
    match bearer(&headers) {
        Some(token) if token == ACCESS_TOKEN => Json(json!({
            "authenticated": true,
            "client_id": CLIENT_ID,
            "user_id": USER_ID,
        })),
        _ => Json(json!({"authenticated": false})),
    }
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    let present = |key: &str| form.get(key).is_some_and(|value| !value.is_empty());
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if present("code") => Ok(Json(credentials())),
        Some("refresh_token") if present("refresh_token") => Ok(Json(credentials())),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

fn credentials() -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "client_id": CLIENT_ID,
        "expires_in": 21600,
        "refresh_token": REFRESH_TOKEN,
        "token_type": "Bearer",
        "user_id": USER_ID,
    })
}

async fn accounts(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    Ok(Json(json!({"accounts": [{
        "id": ACCOUNT_ID,
        "created": "2016-01-26T18:42:04.924Z",
        "description": "Personal account",
    }]})))
}

async fn balance(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    if query.get("account_id").map(String::as_str) != Some(ACCOUNT_ID) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "balance": 9223372036854775807i64,
        "currency": "GBP",
        "spend_today": -250,
    })))
}

async fn list_transactions(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    if query.get("account_id").map(String::as_str) != Some(ACCOUNT_ID) {
        return Err(StatusCode::NOT_FOUND);
    }
    let state = db.read().await;
    let transactions: Vec<&Transaction> = state.transactions.values().collect();
    Ok(Json(json!({"transactions": transactions})))
}

async fn get_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let state = db.read().await;
    let transaction = state.transactions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({"transaction": transaction})))
}

async fn annotate_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let mut state = db.write().await;
    let transaction = state.transactions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    for (key, value) in &form {
        let Some(field) = key.strip_prefix("metadata[").and_then(|key| key.strip_suffix(']'))
        else {
            continue;
        };
        // an empty value deletes the annotation, as the real API does
        if value.is_empty() {
            transaction.metadata.remove(field);
        } else {
            transaction.metadata.insert(field.to_owned(), value.clone());
        }
    }
    Ok(Json(json!({"transaction": transaction})))
}

async fn create_feed_item(
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let present = |key: &str| form.get(key).is_some_and(|value| !value.is_empty());
    if !present("account_id") || !present("params[title]") || !present("params[image_url]") {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({})))
}

async fn create_webhook(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let field = |key: &str| {
        form.get(key)
            .cloned()
            .filter(|value| !value.is_empty())
            .ok_or(StatusCode::BAD_REQUEST)
    };
    let webhook = Webhook {
        id: format!("webhook_{}", Uuid::new_v4().simple()),
        account_id: field("account_id")?,
        url: field("url")?,
    };
    db.write().await.webhooks.insert(webhook.id.clone(), webhook.clone());
    Ok(Json(json!({"webhook": webhook})))
}

async fn list_webhooks(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let account_id = query.get("account_id").ok_or(StatusCode::BAD_REQUEST)?;
    let state = db.read().await;
    let webhooks: Vec<&Webhook> = state
        .webhooks
        .values()
        .filter(|webhook| &webhook.account_id == account_id)
        .collect();
    Ok(Json(json!({"webhooks": webhooks})))
}

async fn delete_webhook(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let mut state = db.write().await;
    state.webhooks.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({})))
}
