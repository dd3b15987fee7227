//! Client for the Cube Chrono API: accounts, timing sessions, and scrambles.
//!
//! All requests block. Call them from a background thread (or
//! `spawn_blocking` in an async runtime).

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use cubechrono_core::{Scramble, ScrambleBatch, ScrambleError, ScrambleRequest, SolveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ureq::config::Config;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

/// API used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn default_agent(timeout: Duration, base_url: &str) -> Agent {
    Config::builder()
        .timeout_global(Some(timeout))
        .https_only(base_url.starts_with("https"))
        // error statuses are turned into `Error::Api` with the message from
        // the body
        .http_status_as_error(false)
        .build()
        .into()
}

/// Error type used for API requests.
#[derive(thiserror::Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error("{0}")]
    Ureq(#[from] ureq::Error),
    #[error("API responded with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing field {0:?} in API response")]
    MissingField(&'static str),
    #[error("{0}")]
    Scramble(#[from] ScrambleError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("API sent invalid scrambles: {0}")]
    InvalidScrambles(String),
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Ureq(ureq::Error::Json(e))
    }
}

impl Error {
    /// Returns whether the API could not be reached at all, as opposed to
    /// responding with an error.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Error::Ureq(
                ureq::Error::Io(_)
                    | ureq::Error::Timeout(_)
                    | ureq::Error::HostNotFound
                    | ureq::Error::ConnectionFailed
            ) | Error::Io(_)
        )
    }

    /// Returns the HTTP status the API responded with, if it responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Username and password sent to the login and register endpoints.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Plaintext password. **This should be kept secret.**
    pub password: String,
}
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Tokens issued on login.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token used to obtain new access tokens.
    pub refresh_token: String,
}
impl AuthTokens {
    /// Extracts tokens from a login response, which may carry them either
    /// inside `payload` or at the top level.
    pub fn from_response(body: &serde_json::Value) -> Option<Self> {
        Some(Self {
            access_token: payload_str(body, "access_token")?.to_owned(),
            refresh_token: payload_str(body, "refresh_token")?.to_owned(),
        })
    }
}

/// Info about the logged-in account, from the profile endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountInfo {
    /// Account name.
    pub username: String,
    /// Roles such as `"User"`, `"Admin"`, or `{"EventModerator": ...}`.
    #[serde(default)]
    pub roles: Vec<serde_json::Value>,
}
impl AccountInfo {
    /// Extracts the account from a profile response.
    pub fn from_response(body: &serde_json::Value) -> Option<Self> {
        let account = payload_field(body, "logged_account")?;
        serde_json::from_value(account.clone()).ok()
    }

    /// Returns whether the account has the `Admin` role.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role.as_str() == Some("Admin"))
    }
}

/// Request body to create a timing session with no times.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    /// Display name of the session.
    pub name: String,
}

/// Request body to append a solve to a timing session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddTime {
    /// ID of the session to append to.
    pub session_id: String,
    /// Solve to append.
    pub time: SolveTime,
}

/// Handle to the API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    agent: Agent,
}
impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
impl ApiClient {
    /// Constructs a client for the API at `base_url`, such as
    /// [`DEFAULT_API_URL`].
    ///
    /// This does not send any network requests.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Constructs a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let agent = default_agent(timeout, &base_url);
        Self { base_url, agent }
    }

    /// Returns the base URL of the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Logs in and returns the response, which contains the tokens (see
    /// [`AuthTokens::from_response()`]).
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn login(&self, credentials: &Credentials) -> Result<serde_json::Value, Error> {
        log::debug!("logging in as {:?}", credentials.username);
        read_response(self.post("/auth/login", None).send_json(credentials)?)
    }

    /// Creates a new account.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn register(&self, credentials: &Credentials) -> Result<serde_json::Value, Error> {
        log::debug!("registering {:?}", credentials.username);
        read_response(self.post("/auth/register", None).send_json(credentials)?)
    }

    /// Invalidates a refresh token.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn logout(&self, refresh_token: &str) -> Result<serde_json::Value, Error> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        read_response(self.post("/auth/logout", None).send_json(&body)?)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn refresh(&self, refresh_token: &str) -> Result<String, Error> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let response: serde_json::Value =
            read_response(self.post("/auth/refresh", None).send_json(&body)?)?;
        payload_str(&response, "access_token")
            .map(str::to_owned)
            .ok_or(Error::MissingField("access_token"))
    }

    /// Returns the profile of the account that owns `access_token`.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn profile(&self, access_token: &str) -> Result<serde_json::Value, Error> {
        read_response(self.get("/profiles", Some(access_token)).call()?)
    }

    /// Returns all timing sessions of the account.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn sessions(&self, access_token: &str) -> Result<serde_json::Value, Error> {
        read_response(self.get("/sessions", Some(access_token)).call()?)
    }

    /// Returns a single timing session of the account.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn session(&self, access_token: &str, id: &str) -> Result<serde_json::Value, Error> {
        check_path_segment(id)?;
        read_response(self.get(&format!("/sessions/{id}"), Some(access_token)).call()?)
    }

    /// Creates an empty timing session.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn create_empty_session(
        &self,
        access_token: &str,
        session: &NewSession,
    ) -> Result<serde_json::Value, Error> {
        read_response(
            self.post("/sessions/empty", Some(access_token))
                .send_json(session)?,
        )
    }

    /// Appends a solve to a timing session.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn add_time(
        &self,
        access_token: &str,
        add_time: &AddTime,
    ) -> Result<serde_json::Value, Error> {
        read_response(
            self.post("/sessions/add-time", Some(access_token))
                .send_json(add_time)?,
        )
    }

    /// Requests scrambles from the API.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn scrambles(&self, request: &ScrambleRequest) -> Result<ScrambleBatch, Error> {
        let response: serde_json::Value = read_response(
            self.get("/scrambles", None)
                .query_pairs(json_map_to_query_pairs(request)?)
                .call()?,
        )?;
        let scrambles = payload_field(&response, "scrambles")
            .ok_or(Error::MissingField("scrambles"))?;
        let scrambles: Vec<Scramble> = serde_json::from_value(scrambles.clone())?;
        check_remote_scrambles(request, &scrambles)?;
        Ok(ScrambleBatch {
            kind: request.kind.clone(),
            scrambles,
        })
    }

    /// Requests scrambles from the API, generating them locally if the API
    /// cannot be reached, does not serve scrambles, or sends a batch that
    /// does not match the request.
    ///
    /// **This method blocks and should be run on a background thread.**
    pub fn scrambles_or_local(&self, request: &ScrambleRequest) -> Result<ScrambleBatch, Error> {
        match self.scrambles(request) {
            Err(e)
                if e.is_unreachable()
                    || matches!(e, Error::InvalidScrambles(_))
                    || matches!(e.status(), Some(404 | 501)) =>
            {
                log::warn!("scramble API unavailable ({e}); generating locally");
                Ok(request.generate()?)
            }
            result => result,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
    fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder<WithoutBody> {
        let mut req = self
            .agent
            .get(self.url(path))
            .header("Accept", "application/json");
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }
    fn post(&self, path: &str, token: Option<&str>) -> RequestBuilder<WithBody> {
        let mut req = self
            .agent
            .post(self.url(path))
            .header("Accept", "application/json");
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }
}

/// Reads a JSON body on success, or turns an error status into
/// [`Error::Api`].
fn read_response<T: DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, Error> {
    let status = response.status();
    let text = response.into_body().read_to_string()?;
    if status.is_success() {
        // some endpoints answer with an empty body
        let text = if text.trim().is_empty() { "null" } else { &text };
        Ok(serde_json::from_str(text)?)
    } else {
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| Some(body.get("error")?.as_str()?.to_owned()));
        log::debug!("API error {status}: {message:?}");
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Rejects IDs that would not stay inside a single path segment.
fn check_path_segment(id: &str) -> Result<(), Error> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '?', '#', '%']) {
        return Err(Error::InvalidArgument(format!("invalid session ID {id:?}")));
    }
    Ok(())
}

/// Checks that a batch from the API holds exactly what was requested.
fn check_remote_scrambles(request: &ScrambleRequest, scrambles: &[Scramble]) -> Result<(), Error> {
    if usize::try_from(request.count).ok() != Some(scrambles.len()) {
        return Err(Error::InvalidScrambles(format!(
            "requested {} scrambles, got {}",
            request.count,
            scrambles.len(),
        )));
    }
    for (i, scramble) in scrambles.iter().enumerate() {
        if scramble.kind != request.kind {
            return Err(Error::InvalidScrambles(format!(
                "scramble {i} is for {}, not {}",
                scramble.kind, request.kind,
            )));
        }
        scramble
            .validate()
            .map_err(|e| Error::InvalidScrambles(format!("scramble {i}: {e}")))?;
    }
    Ok(())
}

/// Looks up `key` inside `payload`, falling back to the top level.
pub fn payload_field<'a>(body: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    body.get("payload")
        .and_then(|payload| payload.get(key))
        .or_else(|| body.get(key))
}

fn payload_str<'a>(body: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    payload_field(body, key)?.as_str()
}

fn json_map_to_query_pairs<T: serde::Serialize>(
    value: &T,
) -> Result<Vec<(String, Cow<'static, str>)>, Error> {
    let mut query_pairs: Vec<(String, Cow<'static, str>)> = vec![];
    let json_value = serde_json::to_value(value)?;
    for (k, v) in json_value
        .as_object()
        .ok_or(Error::Internal("expected JSON object"))?
    {
        let value_string = match v {
            serde_json::Value::Null => continue, // skip
            serde_json::Value::Bool(b) => b.to_string().into(),
            serde_json::Value::Number(number) => number.to_string().into(),
            serde_json::Value::String(s) => s.clone().into(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(Error::Internal("expected JSON primitive"));
            }
        };
        query_pairs.push((k.clone(), value_string));
    }
    Ok(query_pairs)
}
