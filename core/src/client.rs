//! The client surface: one method per API endpoint, all flowing through a
//! shared retrieve/deliver pipeline.
//!
//! # Design
//! `Client` holds only the injected transport and carries no mutable state
//! between calls. Every endpoint method builds an `ApiRequest`, executes a
//! single round trip, classifies the status, and (for `retrieve` calls)
//! decodes the JSON body into its typed result. `deliver` calls stop after
//! the status check and discard the body.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ClientError;
use crate::http::{Method, Response, Transport};
use crate::json::{self, field, FromJson, FromJsonArray, JsonObject};
use crate::params::{Parameter, Parameters};
use crate::request::ApiRequest;
use crate::types::{
    AccessTokenInfo, Account, Balance, Credentials, FeedItem, Since, Transaction, Webhook,
};

/// Host of the OAuth authorization page users are redirected to.
const AUTH_HOST: &str = "auth.getmondo.co.uk";

/// Typed Monzo API client over an injected transport.
pub struct Client<T> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Client<T> {
        Client { transport }
    }

    /// Exchange an OAuth authorization code for credentials.
    pub fn authenticate(
        &self,
        authorization_code: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Credentials, ClientError> {
        let request = ApiRequest {
            method: Method::Post,
            path: "oauth2/token".to_owned(),
            access_token: None,
            parameters: Parameters::new(vec![
                Parameter::simple("grant_type", "authorization_code"),
                Parameter::simple("client_id", client_id),
                Parameter::simple("client_secret", client_secret),
                Parameter::simple("redirect_uri", ""),
                Parameter::simple("code", authorization_code),
            ]),
        };
        self.retrieve(&request)
    }

    /// Trade a refresh token for a fresh set of credentials.
    pub fn refresh_access_token(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Credentials, ClientError> {
        let request = ApiRequest {
            method: Method::Post,
            path: "oauth2/token".to_owned(),
            access_token: None,
            parameters: Parameters::new(vec![
                Parameter::simple("grant_type", "refresh_token"),
                Parameter::simple("client_id", client_id),
                Parameter::simple("client_secret", client_secret),
                Parameter::simple("refresh_token", refresh_token),
            ]),
        };
        self.retrieve(&request)
    }

    /// Liveness check; requires the canonical `pong` reply.
    pub fn ping(&self, access_token: Option<&str>) -> Result<(), ClientError> {
        let request = ApiRequest {
            method: Method::Get,
            path: "ping".to_owned(),
            access_token: access_token.map(str::to_owned),
            parameters: Parameters::empty(),
        };
        let object = self.retrieve_object(&request)?;
        let reply: String = field(&object, "ping")?;
        if reply == "pong" {
            Ok(())
        } else {
            Err(ClientError::Parsing(format!("unexpected ping reply `{reply}`")))
        }
    }

    /// Ask the API what it knows about the presented access token.
    pub fn whoami(&self, access_token: Option<&str>) -> Result<AccessTokenInfo, ClientError> {
        let request = ApiRequest {
            method: Method::Get,
            path: "ping/whoami".to_owned(),
            access_token: access_token.map(str::to_owned),
            parameters: Parameters::empty(),
        };
        self.retrieve(&request)
    }

    pub fn accounts(&self, access_token: &str) -> Result<Vec<Account>, ClientError> {
        let request = ApiRequest {
            method: Method::Get,
            path: "accounts".to_owned(),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::empty(),
        };
        self.retrieve_list(&request)
    }

    pub fn balance(&self, access_token: &str, account_id: &str) -> Result<Balance, ClientError> {
        let request = ApiRequest {
            method: Method::Get,
            path: "balance".to_owned(),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::new(vec![Parameter::simple("account_id", account_id)]),
        };
        self.retrieve(&request)
    }

    /// List transactions on an account, optionally bounded by `since` /
    /// `before` and capped at `limit` results.
    pub fn transactions(
        &self,
        access_token: &str,
        account_id: &str,
        since: Option<Since>,
        before: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>, ClientError> {
        let mut parameters = vec![Parameter::simple("account_id", account_id)];
        parameters.extend(Parameter::optional("since", since.map(|since| since.render())));
        parameters.extend(Parameter::optional("before", before.map(json::format_iso8601)));
        parameters.extend(Parameter::optional("limit", limit.map(|limit| limit.to_string())));
        let request = ApiRequest {
            method: Method::Get,
            path: "transactions".to_owned(),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::new(parameters),
        };
        self.retrieve_list(&request)
    }

    pub fn transaction(&self, access_token: &str, id: &str) -> Result<Transaction, ClientError> {
        let request = ApiRequest {
            method: Method::Get,
            path: format!("transactions/{id}"),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::empty(),
        };
        self.retrieve(&request)
    }

    /// Attach key/value annotations to a transaction.
    pub fn annotate_transaction(
        &self,
        access_token: &str,
        id: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<(), ClientError> {
        let entries = metadata
            .iter()
            .map(|(key, value)| (key.clone(), Some(value.clone())));
        let request = ApiRequest {
            method: Method::Patch,
            path: format!("transactions/{id}"),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::new(vec![Parameter::dictionary("metadata", entries)]),
        };
        self.deliver(&request)
    }

    /// Publish an item into the account's feed.
    pub fn create_feed_item(
        &self,
        access_token: &str,
        account_id: &str,
        item: &FeedItem,
    ) -> Result<(), ClientError> {
        let mut parameters = vec![Parameter::simple("account_id", account_id)];
        parameters.extend(Parameter::optional("url", item.url.clone()));
        parameters.push(Parameter::dictionary(
            "params",
            [
                ("title".to_owned(), Some(item.title.clone())),
                ("image_url".to_owned(), Some(item.image_url.clone())),
                ("body".to_owned(), item.body.clone()),
                ("background_color".to_owned(), item.background_color.clone()),
                ("body_color".to_owned(), item.body_color.clone()),
                ("title_color".to_owned(), item.title_color.clone()),
            ],
        ));
        let request = ApiRequest {
            method: Method::Post,
            path: "feed".to_owned(),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::new(parameters),
        };
        self.deliver(&request)
    }

    pub fn create_webhook(
        &self,
        access_token: &str,
        account_id: &str,
        url: &str,
    ) -> Result<Webhook, ClientError> {
        let request = ApiRequest {
            method: Method::Post,
            path: "webhooks".to_owned(),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::new(vec![
                Parameter::simple("account_id", account_id),
                Parameter::simple("url", url),
            ]),
        };
        self.retrieve(&request)
    }

    pub fn webhooks(&self, access_token: &str, account_id: &str) -> Result<Vec<Webhook>, ClientError> {
        let request = ApiRequest {
            method: Method::Get,
            path: "webhooks".to_owned(),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::new(vec![Parameter::simple("account_id", account_id)]),
        };
        self.retrieve_list(&request)
    }

    pub fn delete_webhook(&self, access_token: &str, id: &str) -> Result<(), ClientError> {
        let request = ApiRequest {
            method: Method::Delete,
            path: format!("webhooks/{id}"),
            access_token: Some(access_token.to_owned()),
            parameters: Parameters::empty(),
        };
        self.deliver(&request)
    }

    /// Execute a call whose only meaningful outcome is its status; the body
    /// is discarded.
    fn deliver(&self, request: &ApiRequest) -> Result<(), ClientError> {
        let response = self.respond(request)?;
        validate_status(&response)
    }

    fn retrieve<R: FromJson>(&self, request: &ApiRequest) -> Result<R, ClientError> {
        let object = self.retrieve_object(request)?;
        json::decode(&object)
    }

    fn retrieve_list<R: FromJsonArray>(&self, request: &ApiRequest) -> Result<Vec<R>, ClientError> {
        let object = self.retrieve_object(request)?;
        json::decode_list(&object)
    }

    fn retrieve_object(&self, request: &ApiRequest) -> Result<JsonObject, ClientError> {
        let response = self.respond(request)?;
        validate_status(&response)?;
        parse_object(&response.body)
    }

    fn respond(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        self.transport
            .respond(&request.build())
            .map_err(ClientError::Transport)
    }
}

/// The OAuth authorization page a user is sent to at the start of the flow.
pub fn authorization_url(client_id: &str, redirect_uri: &str, nonce: &str) -> String {
    let parameters = Parameters::new(vec![
        Parameter::simple("client_id", client_id),
        Parameter::simple("redirect_uri", redirect_uri),
        Parameter::simple("state", nonce),
    ]);
    format!("https://{AUTH_HOST}/?{}", parameters.url_query_encoded())
}

/// Classify the response status: success, expired credentials, or error.
fn validate_status(response: &Response) -> Result<(), ClientError> {
    match response.status {
        0..=299 => Ok(()),
        401 => Err(ClientError::AccessTokenInvalid),
        status => Err(ClientError::Response { status }),
    }
}

fn parse_object(body: &[u8]) -> Result<JsonObject, ClientError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| ClientError::Parsing(err.to_string()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(ClientError::Parsing("top-level JSON value is not an object".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use std::cell::RefCell;
    use std::error::Error;

    /// Returns a canned response for every request.
    struct StubTransport {
        status: u16,
        body: String,
    }

    impl Transport for StubTransport {
        fn respond(&self, _request: &Request) -> Result<Response, Box<dyn Error + Send + Sync>> {
            Ok(Response {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone().into_bytes(),
            })
        }
    }

    /// Captures the last request and replies 200 `{}`.
    #[derive(Default)]
    struct SpyTransport {
        last: RefCell<Option<Request>>,
    }

    impl Transport for SpyTransport {
        fn respond(&self, request: &Request) -> Result<Response, Box<dyn Error + Send + Sync>> {
            *self.last.borrow_mut() = Some(request.clone());
            Ok(Response {
                status: 200,
                headers: Vec::new(),
                body: b"{}".to_vec(),
            })
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn respond(&self, _request: &Request) -> Result<Response, Box<dyn Error + Send + Sync>> {
            Err("connection reset".into())
        }
    }

    fn client_returning(status: u16, body: &str) -> Client<StubTransport> {
        Client::new(StubTransport {
            status,
            body: body.to_owned(),
        })
    }

    fn captured_request(action: impl Fn(&Client<&SpyTransport>)) -> Request {
        let spy = SpyTransport::default();
        action(&Client::new(&spy));
        let captured = spy.last.borrow().clone();
        captured.expect("no request was executed")
    }

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(header_name, _)| header_name == name)
            .map(|(_, value)| value.as_str())
    }

    fn body_string(request: &Request) -> String {
        String::from_utf8(request.body.clone()).unwrap()
    }

    // --- request shapes ---

    #[test]
    fn accounts_issues_an_authorized_get() {
        let request = captured_request(|client| {
            let _ = client.accounts("a_token");
        });
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.uri, "https://api.monzo.com/accounts");
        assert_eq!(header(&request, "host"), Some("api.monzo.com"));
        assert_eq!(header(&request, "connection"), Some("close"));
        assert_eq!(header(&request, "authorization"), Some("Bearer a_token"));
        assert!(request.body.is_empty());
    }

    #[test]
    fn balance_carries_the_account_id_in_the_query() {
        let request = captured_request(|client| {
            let _ = client.balance("a_token", "an_account_id");
        });
        assert_eq!(request.uri, "https://api.monzo.com/balance?account_id=an_account_id");
    }

    #[test]
    fn whoami_without_token_has_no_authorization_header() {
        let request = captured_request(|client| {
            let _ = client.whoami(None);
        });
        assert_eq!(request.uri, "https://api.monzo.com/ping/whoami");
        assert_eq!(header(&request, "authorization"), None);
    }

    #[test]
    fn transactions_renders_only_the_supplied_filters() {
        let before = DateTime::parse_from_rfc3339("2016-01-26T18:42:04.924Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = captured_request(|client| {
            let _ = client.transactions(
                "a_token",
                "an_account_id",
                Some(Since::Transaction("tx_1".to_owned())),
                Some(before),
                Some(10),
            );
        });
        assert_eq!(
            request.uri,
            "https://api.monzo.com/transactions?account_id=an_account_id\
             &since=tx_1&before=2016-01-26T18:42:04.924Z&limit=10"
        );

        let request = captured_request(|client| {
            let _ = client.transactions("a_token", "an_account_id", None, None, None);
        });
        assert_eq!(request.uri, "https://api.monzo.com/transactions?account_id=an_account_id");
    }

    #[test]
    fn annotate_patches_a_metadata_dictionary() {
        let metadata = HashMap::from([("key1".to_owned(), "value1".to_owned())]);
        let request = captured_request(|client| {
            let _ = client.annotate_transaction("a_token", "tx_1", &metadata);
        });
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.uri, "https://api.monzo.com/transactions/tx_1");
        assert_eq!(
            header(&request, "content-type"),
            Some("application/x-www-form-urlencoded; charset=utf-8")
        );
        assert_eq!(body_string(&request), "metadata[key1]=value1");
    }

    #[test]
    fn create_feed_item_posts_the_nested_params_dictionary() {
        let item = FeedItem {
            title: "happy days! 🕺🏽".to_owned(),
            image_url: "http://images.domain/an-image.jpeg?param=j&other=k".to_owned(),
            url: Some("http://my.website/?param1=1&param2=2".to_owned()),
            body: Some("this is a sample body".to_owned()),
            background_color: Some("#FFFFFF".to_owned()),
            body_color: Some("#AAAAAA".to_owned()),
            title_color: Some("#BBBBBB".to_owned()),
        };
        let request = captured_request(|client| {
            let _ = client.create_feed_item("a_token", "an_account_id", &item);
        });
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.uri, "https://api.monzo.com/feed");
        let body = body_string(&request);
        assert!(body.contains("account_id=an_account_id"), "{body}");
        assert!(body.contains("params[title]=happy+days%21+%F0%9F%95%BA%F0%9F%8F%BD"), "{body}");
        assert!(
            body.contains("params[image_url]=http%3A%2F%2Fimages.domain%2Fan-image.jpeg%3Fparam%3Dj%26other%3Dk"),
            "{body}"
        );
        assert!(body.contains("url=http%3A%2F%2Fmy.website%2F%3Fparam1%3D1%26param2%3D2"), "{body}");
        assert!(body.contains("params[body]=this+is+a+sample+body"), "{body}");
        assert!(body.contains("params[background_color]=%23FFFFFF"), "{body}");
        assert!(body.contains("params[body_color]=%23AAAAAA"), "{body}");
        assert!(body.contains("params[title_color]=%23BBBBBB"), "{body}");
    }

    #[test]
    fn create_feed_item_omits_absent_optionals() {
        let item = FeedItem {
            title: "a title".to_owned(),
            image_url: "http://images.domain/an-image.jpeg".to_owned(),
            ..FeedItem::default()
        };
        let request = captured_request(|client| {
            let _ = client.create_feed_item("a_token", "an_account_id", &item);
        });
        let body = body_string(&request);
        assert!(!body.contains("params[body]"), "{body}");
        assert!(!body.contains("params[background_color]"), "{body}");
        assert!(!body.contains("url="), "{body}");
    }

    #[test]
    fn authenticate_posts_the_authorization_code_grant() {
        let request = captured_request(|client| {
            let _ = client.authenticate("a_code", "a_client_id", "a_secret");
        });
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.uri, "https://api.monzo.com/oauth2/token");
        assert_eq!(header(&request, "authorization"), None);
        let body = body_string(&request);
        assert!(body.contains("grant_type=authorization_code"), "{body}");
        assert!(body.contains("client_id=a_client_id"), "{body}");
        assert!(body.contains("client_secret=a_secret"), "{body}");
        assert!(body.contains("redirect_uri="), "{body}");
        assert!(body.contains("code=a_code"), "{body}");
    }

    #[test]
    fn refresh_posts_the_refresh_token_grant() {
        let request = captured_request(|client| {
            let _ = client.refresh_access_token("a_refresh_token", "a_client_id", "a_secret");
        });
        let body = body_string(&request);
        assert!(body.contains("grant_type=refresh_token"), "{body}");
        assert!(body.contains("refresh_token=a_refresh_token"), "{body}");
    }

    #[test]
    fn delete_webhook_issues_a_delete() {
        let request = captured_request(|client| {
            let _ = client.delete_webhook("a_token", "webhook_id");
        });
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.uri, "https://api.monzo.com/webhooks/webhook_id");
        assert!(request.body.is_empty());
    }

    // --- response handling ---

    #[test]
    fn accounts_decode_from_the_array_envelope() {
        let client = client_returning(
            200,
            r#"{"accounts":[{"id":"an_account_id","created":"2016-01-26T18:42:04.924Z","description":"this is a description"}]}"#,
        );
        let accounts = client.accounts("a_token").unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, "an_account_id");
        assert_eq!(json::format_iso8601(accounts[0].created), "2016-01-26T18:42:04.924Z");
        assert_eq!(accounts[0].description, "this is a description");
    }

    #[test]
    fn whoami_decodes_the_unauthenticated_variant_without_extra_fields() {
        let client = client_returning(200, r#"{"authenticated":false}"#);
        assert_eq!(client.whoami(None).unwrap(), AccessTokenInfo::NotAuthenticated);
    }

    #[test]
    fn balance_decodes_64_bit_amounts() {
        let client = client_returning(
            200,
            r#"{"balance":9223372036854775807,"currency":"GBP","spend_today":-250}"#,
        );
        let balance = client.balance("a_token", "an_account_id").unwrap();
        assert_eq!(balance.balance, i64::MAX);
        assert_eq!(balance.spend_today, -250);
    }

    #[test]
    fn create_webhook_unwraps_the_envelope() {
        let client = client_returning(
            200,
            r#"{"webhook":{"id":"webhook_id","account_id":"an_account_id","url":"http://a.b"}}"#,
        );
        let webhook = client.create_webhook("a_token", "an_account_id", "http://a.b").unwrap();
        assert_eq!(webhook.id, "webhook_id");
        assert_eq!(webhook.url, "http://a.b");
    }

    #[test]
    fn status_401_is_access_token_invalid_for_retrieve_and_deliver() {
        let client = client_returning(401, "");
        assert!(matches!(
            client.accounts("a_token").unwrap_err(),
            ClientError::AccessTokenInvalid
        ));
        assert!(matches!(
            client.delete_webhook("a_token", "webhook_id").unwrap_err(),
            ClientError::AccessTokenInvalid
        ));
    }

    #[test]
    fn other_error_statuses_carry_the_literal_code() {
        let client = client_returning(400, "");
        assert!(matches!(
            client.accounts("a_token").unwrap_err(),
            ClientError::Response { status: 400 }
        ));
        assert!(matches!(
            client.create_feed_item("a_token", "an_account_id", &FeedItem::default()).unwrap_err(),
            ClientError::Response { status: 400 }
        ));
    }

    #[test]
    fn deliver_ignores_the_body_on_success() {
        let client = client_returning(200, "");
        assert!(client.delete_webhook("a_token", "webhook_id").is_ok());
    }

    #[test]
    fn missing_fields_surface_as_parsing_errors() {
        let client = client_returning(200, "{}");
        assert!(matches!(
            client.accounts("a_token").unwrap_err(),
            ClientError::Parsing(_)
        ));
    }

    #[test]
    fn invalid_json_is_a_parsing_error() {
        let client = client_returning(200, "not json");
        assert!(matches!(
            client.accounts("a_token").unwrap_err(),
            ClientError::Parsing(_)
        ));
    }

    #[test]
    fn non_object_top_level_is_a_parsing_error() {
        let client = client_returning(200, "[]");
        assert!(matches!(
            client.accounts("a_token").unwrap_err(),
            ClientError::Parsing(_)
        ));
    }

    #[test]
    fn ping_accepts_pong_and_rejects_anything_else() {
        assert!(client_returning(200, r#"{"ping":"pong"}"#).ping(None).is_ok());
        assert!(matches!(
            client_returning(200, r#"{"ping":"ping"}"#).ping(None).unwrap_err(),
            ClientError::Parsing(_)
        ));
    }

    #[test]
    fn transport_failures_propagate_typed() {
        let client = Client::new(FailingTransport);
        let err = client.accounts("a_token").unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    // --- authorization url ---

    #[test]
    fn authorization_url_query_encodes_every_value() {
        let url = authorization_url("aClientId", "http://host.com/?test=[]#fragment", "abc123");
        assert!(url.starts_with("https://auth.getmondo.co.uk/?"), "{url}");
        assert!(url.contains("client_id=aClientId"), "{url}");
        assert!(url.contains("redirect_uri=http://host.com/?test=%5B%5D%23fragment"), "{url}");
        assert!(url.contains("state=abc123"), "{url}");
    }
}
