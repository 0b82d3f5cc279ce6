use std::sync::Arc;
use std::time::Instant;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use haru_core::{ApiError, Envelope, RefreshRequest, RefreshResponse, TokenPair};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::session::{SessionBroadcast, SessionSubscription};
use crate::token_store::{TokenStore, TokenStoreError};

type RefreshFuture = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// Why a refresh could not produce a new access token. Never surfaced to
/// callers: they get the original 401 error instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected with status {0}")]
    Rejected(u16),
    #[error("refresh request failed: {0}")]
    Transport(String),
    #[error("refresh response could not be decoded: {0}")]
    Decode(String),
    #[error("token store failed during refresh: {0}")]
    Storage(String),
}

impl From<TokenStoreError> for RefreshError {
    fn from(err: TokenStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Outbound call relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Sent without a bearer token and never refreshed (login, signup).
    pub anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            anonymous: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::decode(format!("failed to encode request body: {err}")))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
}

enum Dispatched {
    Body(Vec<u8>),
    Unauthorized(ApiError),
}

/// HTTP client that attaches the stored bearer token and recovers from an
/// expired access token with a single refresh and a single retry.
///
/// Cloning is cheap; clones share the token store, the session broadcast and
/// the in-flight refresh.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    session: SessionBroadcast,
    in_flight: Mutex<Option<RefreshFuture>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.allow_insecure)
            .build()?;
        Self::with_parts(config, http, tokens, SessionBroadcast::new())
    }

    pub fn with_parts(
        config: ClientConfig,
        http: reqwest::Client,
        tokens: Arc<dyn TokenStore>,
        session: SessionBroadcast,
    ) -> Result<Self, ConfigError> {
        config.ensure_secure()?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                tokens,
                session,
                in_flight: Mutex::new(None),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    #[must_use]
    pub fn session(&self) -> &SessionBroadcast {
        &self.inner.session
    }

    pub fn subscribe(&self) -> SessionSubscription {
        self.inner.session.subscribe()
    }

    /// Underlying transport without bearer handling, for calls that leave
    /// the backend (presigned uploads).
    #[must_use]
    pub fn raw_http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub fn set_tokens(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        self.inner
            .tokens
            .set_tokens(tokens)
            .map_err(|err| ApiError::storage(err.to_string()))
    }

    pub fn clear_tokens(&self) -> Result<(), ApiError> {
        self.inner
            .tokens
            .clear()
            .map_err(|err| ApiError::storage(err.to_string()))
    }

    /// Sends the request and decodes the whole 2xx body as `T`.
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        decode_body(&body)
    }

    /// Sends the request and unwraps the `{ "data": T }` envelope.
    pub async fn request_data<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ApiError> {
        let envelope: Envelope<T> = self.request(request).await?;
        Ok(envelope.into_data())
    }

    /// Sends the request and discards any 2xx body.
    pub async fn send(&self, request: &ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(&ApiRequest::get(path)).await
    }

    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_data(&ApiRequest::get(path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = query
            .iter()
            .fold(ApiRequest::get(path), |request, (key, value)| {
                request.query(*key, *value)
            });
        self.request(&request).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn post_data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_data(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(&ApiRequest::patch(path).json(body)?).await
    }

    pub async fn patch_data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_data(&ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(&ApiRequest::delete(path)).await
    }

    pub async fn delete_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_data(&ApiRequest::delete(path)).await
    }

    async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, ApiError> {
        let token = if request.anonymous {
            None
        } else {
            self.inner
                .tokens
                .access_token()
                .map_err(|err| ApiError::storage(err.to_string()))?
        };

        let original = match self
            .dispatch(request, token.as_deref(), Attempt::First)
            .await?
        {
            Dispatched::Body(body) => return Ok(body),
            Dispatched::Unauthorized(error) => error,
        };

        info!(
            method = %request.method,
            path = %request.path,
            "http request unauthorized; attempting token refresh"
        );
        let refreshed = self.inner.refreshed_access_token(token.as_deref()).await;
        let fresh = match refreshed {
            Ok(fresh) => fresh,
            Err(err) => {
                debug!(path = %request.path, error = %err, "refresh failed; returning original error");
                return Err(original);
            }
        };

        match self.dispatch(request, Some(&fresh), Attempt::Retry).await? {
            Dispatched::Body(body) => Ok(body),
            Dispatched::Unauthorized(error) => Err(error),
        }
    }

    /// One round trip. A 401 is only handed back for recovery on the first
    /// attempt; a retried request turns it into a plain error.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
        attempt: Attempt,
    ) -> Result<Dispatched, ApiError> {
        let response = self.send_once(request, access_token).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(&err, &self.inner.config))?
            .to_vec();

        if status.is_success() {
            return Ok(Dispatched::Body(body));
        }
        let error = ApiError::from_response(status.as_u16(), &body);
        if status == StatusCode::UNAUTHORIZED && attempt == Attempt::First && !request.anonymous {
            Ok(Dispatched::Unauthorized(error))
        } else {
            Err(error)
        }
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let config = &self.inner.config;
        let url = config.endpoint(&request.path);
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .timeout(config.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            authorized = access_token.is_some(),
            "http request"
        );
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|err| map_transport_error(&err, config))?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis(),
            "http response"
        );
        Ok(response)
    }
}

impl Inner {
    /// Returns a usable access token after `rejected` was refused.
    ///
    /// At most one refresh runs at a time: callers arriving while one is in
    /// flight await the same shared future.
    async fn refreshed_access_token(
        self: &Arc<Self>,
        rejected: Option<&str>,
    ) -> Result<String, RefreshError> {
        let refresh = {
            let mut slot = self.in_flight.lock().await;
            if let Some(in_flight) = slot.as_ref() {
                info!("joining in-flight token refresh");
                in_flight.clone()
            } else {
                // Another request may have finished a refresh after this one
                // was sent with the old token.
                match self.tokens.access_token() {
                    Ok(Some(current)) if Some(current.as_str()) != rejected => {
                        debug!("access token already refreshed; reusing it");
                        return Ok(current);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(error = %err, "failed to read stored access token; refreshing");
                    }
                }
                let inner = Arc::clone(self);
                let refresh = async move { inner.run_refresh().await }.boxed().shared();
                *slot = Some(refresh.clone());
                refresh
            }
        };
        refresh.await
    }

    async fn run_refresh(self: Arc<Self>) -> Result<String, RefreshError> {
        let result = self.refresh_tokens().await;
        match &result {
            Ok(_) => info!("access token refreshed"),
            Err(err) => {
                warn!(error = %err, "token refresh failed; clearing stored tokens");
                if let Err(clear_err) = self.tokens.clear() {
                    warn!(error = %clear_err, "failed to clear stored tokens");
                }
                self.session.invalidate();
            }
        }
        self.in_flight.lock().await.take();
        result
    }

    async fn refresh_tokens(&self) -> Result<String, RefreshError> {
        let refresh_token = self
            .tokens
            .refresh_token()?
            .ok_or(RefreshError::MissingRefreshToken)?;

        let url = self.config.endpoint(&self.config.refresh_path);
        let payload = RefreshRequest { refresh_token };
        let start = Instant::now();
        let response = self
            .http
            .post(url)
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;
        let status = response.status();
        debug!(
            path = %self.config.refresh_path,
            status = %status,
            elapsed_ms = start.elapsed().as_millis(),
            "refresh response"
        );
        if !status.is_success() {
            return Err(RefreshError::Rejected(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;
        let refreshed = parse_refresh_body(&body)?;

        match refreshed.refresh_token.as_deref() {
            Some(rotated) => self
                .tokens
                .set_tokens(&TokenPair::new(refreshed.access_token.as_str(), rotated))?,
            None => self.tokens.set_access_token(&refreshed.access_token)?,
        }
        Ok(refreshed.access_token)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RefreshBody {
    Enveloped(Envelope<RefreshResponse>),
    Flat(RefreshResponse),
}

fn parse_refresh_body(body: &[u8]) -> Result<RefreshResponse, RefreshError> {
    let parsed: RefreshBody =
        serde_json::from_slice(body).map_err(|err| RefreshError::Decode(err.to_string()))?;
    let refreshed = match parsed {
        RefreshBody::Enveloped(envelope) => envelope.into_data(),
        RefreshBody::Flat(flat) => flat,
    };
    if refreshed.access_token.trim().is_empty() {
        return Err(RefreshError::Decode("empty access token".to_string()));
    }
    Ok(refreshed)
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|err| ApiError::decode(err.to_string()))
}

pub(crate) fn map_transport_error(err: &reqwest::Error, config: &ClientConfig) -> ApiError {
    let detail = if err.is_timeout() {
        format!("request timed out after {}ms", config.timeout.as_millis())
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    warn!(error = %detail, "http transport error");
    ApiError::network(detail)
}
