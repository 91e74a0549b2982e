//! The API client: configuration, endpoint methods, and the batched
//! import workflow.

use std::sync::Arc;
use std::time::Duration;

use lbz::batch::{self, BatchPlan};
use lbz::models::{ListenCount, Playlist, TokenValidation, UserListens};
use lbz::rate_limit::{RateLimitSlot, RateLimitSnapshot};
use lbz::submit::{ListenType, SubmitListens, SubmittableListen};
use lbz::wire::{WireDecode, envelope};
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::constants::{
    DEFAULT_API_ROOT, DEFAULT_PAYLOAD_CEILING_BYTES, SUBMIT_LISTENS_PATH, VALIDATE_TOKEN_PATH,
};
use crate::error::ApiError;
use crate::{headers, response};

/// Configuration for [`Client`].
pub struct ClientConfig {
    /// API root URL (without trailing slash).
    pub root: String,

    /// API token sent as `Authorization: Token <token>`, if any.
    pub token: Option<String>,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// The `User-Agent` the client identifies itself with.
    pub user_agent: String,

    /// Byte ceiling on a serialized submission body; bulk imports split
    /// to stay under it.
    pub payload_ceiling: usize,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout and user agent.
    pub http_client: Option<reqwest::Client>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_API_ROOT.to_owned(),
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: concat!("lbz/", env!("CARGO_PKG_VERSION")).to_owned(),
            payload_ceiling: DEFAULT_PAYLOAD_CEILING_BYTES,
            http_client: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config pointing at the given API root.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Sets the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent`.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the submission payload ceiling in bytes.
    #[must_use]
    pub fn with_payload_ceiling(mut self, bytes: usize) -> Self {
        self.payload_ceiling = bytes;
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("root", &self.root)
            .field("has_token", &self.token.is_some())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("payload_ceiling", &self.payload_ceiling)
            .field("has_http_client", &self.http_client.is_some())
            .finish()
    }
}

/// Query parameters for a listen-history page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenQuery {
    /// Only listens strictly newer than this unix timestamp.
    pub min_ts: Option<i64>,
    /// Only listens strictly older than this unix timestamp.
    pub max_ts: Option<i64>,
    /// Page size.
    pub count: Option<u32>,
}

impl ListenQuery {
    /// Only listens newer than `ts`.
    #[must_use]
    pub const fn newer_than(mut self, ts: i64) -> Self {
        self.min_ts = Some(ts);
        self
    }

    /// Only listens older than `ts`.
    #[must_use]
    pub const fn older_than(mut self, ts: i64) -> Self {
        self.max_ts = Some(ts);
        self
    }

    /// At most `count` listens per page.
    #[must_use]
    pub const fn limit(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ts) = self.min_ts {
            pairs.push(("min_ts", ts.to_string()));
        }
        if let Some(ts) = self.max_ts {
            pairs.push(("max_ts", ts.to_string()));
        }
        if let Some(n) = self.count {
            pairs.push(("count", n.to_string()));
        }
        pairs
    }
}

/// Result of a completed (or cancelled) bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Listens accepted by the service.
    pub listens_sent: usize,
    /// Requests sent.
    pub batches_sent: usize,
    /// Whether the import stopped early because the caller cancelled it.
    ///
    /// A cancelled import is not rolled back: already-sent batches stay
    /// submitted.
    pub cancelled: bool,
}

/// Async client for a ListenBrainz-compatible API.
pub struct Client {
    root: String,
    token: Option<String>,
    payload_ceiling: usize,
    http: reqwest::Client,
    rate_limit: RateLimitSlot,
}

impl Client {
    /// Creates a client from the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        let root = config.root.trim_end_matches('/').to_owned();

        let http = config.http_client.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(config.timeout)
                .user_agent(config.user_agent.clone())
                .build()
                .expect("failed to build reqwest::Client")
        });

        Self {
            root,
            token: config.token,
            payload_ceiling: config.payload_ceiling,
            http,
            rate_limit: RateLimitSlot::new(),
        }
    }

    /// Creates a client for the hosted service with the given token.
    #[must_use]
    pub fn hosted(token: impl Into<String>) -> Self {
        Self::new(ClientConfig::default().with_token(token))
    }

    /// Returns the API root this client talks to.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The rate-limit counters observed on the most recently completed
    /// request, if any request has completed yet.
    #[must_use]
    pub fn rate_limit(&self) -> Option<Arc<RateLimitSnapshot>> {
        self.rate_limit.load()
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, format!("Token {token}")),
            None => request,
        }
    }

    /// Sends a prepared request, captures rate-limit headers, and
    /// classifies the response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = self.authorize(request).send().await?;

        if let Some(snapshot) = headers::rate_limit_snapshot(response.headers()) {
            self.rate_limit.store(snapshot);
        }

        let status = response.status();
        let body_is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));
        let body = response.bytes().await?.to_vec();

        tracing::debug!(status = %status, bytes = body.len(), "api response");
        response::interpret(status, body, body_is_json)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>, ApiError> {
        let request = self.http.get(format!("{}{path}", self.root)).query(query);
        self.execute(request).await
    }

    async fn post_json(&self, path: &str, body: String) -> Result<Vec<u8>, ApiError> {
        let request = self
            .http
            .post(format!("{}{path}", self.root))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.execute(request).await
    }

    /// Validates the configured token.
    ///
    /// # Errors
    ///
    /// Fails per [`ApiError`]; note that an *invalid* token is a success
    /// with [`TokenValidation::valid`] `false`, not an error.
    pub async fn validate_token(&self) -> Result<TokenValidation, ApiError> {
        let body = self.get(VALIDATE_TOKEN_PATH, &[]).await?;
        Ok(TokenValidation::decode_slice(&body)?)
    }

    /// Fetches a page of `user`'s listen history.
    ///
    /// # Errors
    ///
    /// Fails per [`ApiError`].
    pub async fn user_listens(
        &self,
        user: &str,
        query: ListenQuery,
    ) -> Result<UserListens, ApiError> {
        let path = format!("/1/user/{user}/listens");
        let body = self.get(&path, &query.pairs()).await?;
        Ok(envelope::decode_payload::<UserListens>(&body)?)
    }

    /// Fetches `user`'s total listen count.
    ///
    /// # Errors
    ///
    /// Fails per [`ApiError`].
    pub async fn user_listen_count(&self, user: &str) -> Result<u64, ApiError> {
        let path = format!("/1/user/{user}/listen-count");
        let body = self.get(&path, &[]).await?;
        let payload = envelope::decode_payload::<ListenCount>(&body)?;
        Ok(payload.count)
    }

    /// Fetches a playlist by MusicBrainz identifier, accepting any of the
    /// service's playlist envelope shapes.
    ///
    /// # Errors
    ///
    /// Fails per [`ApiError`].
    pub async fn playlist(&self, mbid: Uuid) -> Result<Playlist, ApiError> {
        let path = format!("/1/playlist/{mbid}");
        let body = self.get(&path, &[]).await?;
        Ok(Playlist::decode_any_shape(&body)?)
    }

    /// Submits listens in one request.
    ///
    /// Use [`Client::import_listens`] for histories that may exceed the
    /// payload ceiling.
    ///
    /// # Errors
    ///
    /// Fails per [`ApiError`].
    pub async fn submit_listens(
        &self,
        listen_type: ListenType,
        listens: &[SubmittableListen],
    ) -> Result<(), ApiError> {
        let body = serde_json::to_string(&SubmitListens {
            listen_type,
            payload: listens,
        })?;
        self.post_json(SUBMIT_LISTENS_PATH, body).await?;
        Ok(())
    }

    /// Imports a listen history, splitting it under the payload ceiling
    /// and sending the batches strictly sequentially.
    ///
    /// The next batch is only serialized and sent after the previous
    /// request completed, so request ordering and rate-limit feedback
    /// stay meaningful. `cancel` is observed between sends: once it
    /// fires, no further batches go out, and the ones already sent are
    /// neither retried nor rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Import`] wrapping the first batch failure;
    /// remaining batches are not sent.
    pub async fn import_listens(
        &self,
        listens: &[SubmittableListen],
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome, ApiError> {
        let plan: BatchPlan = batch::plan(ListenType::Import, listens, self.payload_ceiling)?;
        let total = plan.len();
        tracing::info!(listens = listens.len(), batches = total, "import planned");

        let mut listens_sent = 0;
        for (index, batch) in plan.batches.into_iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(batches_sent = index, listens_sent, "import cancelled");
                return Ok(ImportOutcome {
                    listens_sent,
                    batches_sent: index,
                    cancelled: true,
                });
            }

            match self.post_json(SUBMIT_LISTENS_PATH, batch.body).await {
                Ok(_) => {
                    listens_sent += batch.span.len();
                    tracing::info!(
                        batch = index + 1,
                        batches = total,
                        listens_sent,
                        "import progress"
                    );
                }
                Err(source) => {
                    return Err(ApiError::Import {
                        listens_sent,
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(ImportOutcome {
            listens_sent,
            batches_sent: total,
            cancelled: false,
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("root", &self.root)
            .field("has_token", &self.token.is_some())
            .field("payload_ceiling", &self.payload_ceiling)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lbz::submit::SubmittableTrack;
    use lbz::timestamp::ListenedAt;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> Client {
        Client::new(ClientConfig::new(server.uri()).with_token("00000000-0000-0000-0000-000000000001"))
    }

    fn listens(n: usize) -> Vec<SubmittableListen> {
        (0..n)
            .map(|i| {
                SubmittableListen::new(
                    ListenedAt::from_unix(1_700_000_000 + i as i64),
                    SubmittableTrack::new("artist", format!("track {i}")),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn validate_token_sends_the_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/validate-token"))
            .and(header(
                "Authorization",
                "Token 00000000-0000-0000-0000-000000000001",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": true,
                "message": "Token valid.",
                "user_name": "rustfan"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let validation = test_client(&server)
            .validate_token()
            .await
            .expect("valid token");
        assert!(validation.valid);
        assert_eq!(validation.user_name.as_deref(), Some("rustfan"));
    }

    #[tokio::test]
    async fn user_listens_decodes_the_payload_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/user/rustfan/listens"))
            .and(query_param("count", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payload": {
                    "count": 1,
                    "user_id": "rustfan",
                    "listens": [{
                        "listened_at": 1_700_000_000,
                        "track_metadata": {
                            "track_name": "Xtal",
                            "artist_name": "Aphex Twin"
                        },
                        "brand_new_server_field": {"nested": true}
                    }]
                }
            })))
            .mount(&server)
            .await;

        let page = test_client(&server)
            .user_listens("rustfan", ListenQuery::default().limit(5))
            .await
            .expect("listens page");
        assert_eq!(page.count, 1);
        assert_eq!(
            page.listens[0].extra["brand_new_server_field"],
            json!({"nested": true})
        );
    }

    #[tokio::test]
    async fn structured_error_with_mismatched_code_is_flagged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/validate-token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": 404, "error": "Not found"})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server).validate_token().await.unwrap_err();
        match err {
            ApiError::Server {
                status,
                code,
                message,
                code_matches_status,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, 404);
                assert_eq!(message, "Not found");
                assert!(!code_matches_status);
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_headers_are_captured_after_each_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/user/rustfan/listen-count"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"payload": {"count": 12_345}}))
                    .insert_header("X-RateLimit-Limit", "50")
                    .insert_header("X-RateLimit-Remaining", "49")
                    .insert_header("X-RateLimit-Reset", "1700000010")
                    .insert_header("X-RateLimit-Reset-In", "9"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(client.rate_limit().is_none());

        let count = client
            .user_listen_count("rustfan")
            .await
            .expect("listen count");
        assert_eq!(count, 12_345);

        let snapshot = client.rate_limit().expect("captured");
        assert_eq!(snapshot.remaining, 49);
        assert_eq!(snapshot.reset_in, 9);
    }

    #[tokio::test]
    async fn import_sends_every_batch_sequentially() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/submit-listens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        // A tight ceiling forces the plan to split.
        let client = Client::new(
            ClientConfig::new(server.uri())
                .with_token("t")
                .with_payload_ceiling(400),
        );
        let items = listens(20);
        let outcome = client
            .import_listens(&items, &CancellationToken::new())
            .await
            .expect("import");

        assert!(!outcome.cancelled);
        assert_eq!(outcome.listens_sent, 20);
        assert!(outcome.batches_sent > 1, "ceiling should force splitting");
        assert_eq!(
            server.received_requests().await.expect("recording").len(),
            outcome.batches_sent
        );
    }

    #[tokio::test]
    async fn import_aborts_remaining_batches_on_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/submit-listens"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"code": 503, "error": "overloaded"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(
            ClientConfig::new(server.uri())
                .with_token("t")
                .with_payload_ceiling(400),
        );
        let items = listens(20);
        let err = client
            .import_listens(&items, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ApiError::Import {
                listens_sent,
                source,
            } => {
                assert_eq!(listens_sent, 0);
                assert!(matches!(*source, ApiError::Server { status: 503, .. }));
            }
            other => panic!("expected Import, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_import_sends_nothing_further() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/submit-listens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = client
            .import_listens(&listens(5), &cancel)
            .await
            .expect("cancel is not an error");
        assert!(outcome.cancelled);
        assert_eq!(outcome.batches_sent, 0);
        assert_eq!(outcome.listens_sent, 0);
    }
}
