// API client module: a small blocking HTTP client for the Lambda Chat
// service. Logging in is an explicit step that turns an `ApiClient` into a
// `Session`; every chat/message call hangs off the `Session`, so nothing
// can be attempted before authentication succeeded.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, Result};

/// Base URL used when neither `--base-url` nor `LAMBDA_CHAT_URL` is set.
pub const DEFAULT_BASE_URL: &str = "https://lambda.chat";

/// Login credentials. The password only ever lives in memory.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server-assigned chat identifier. The backend hands out either numbers
/// or strings, so both are accepted and echoed back verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Number(n) => write!(f, "{}", n),
            ChatId::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for ChatId {
    fn from(s: String) -> Self {
        ChatId::Text(s)
    }
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        ChatId::Text(s.to_string())
    }
}

/// Entry of `GET /chats`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
}

/// Entry of `GET /chats/{id}/messages`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub message: String,
}

/// Body of `POST /chats`.
#[derive(Deserialize)]
struct CreatedChat {
    id: ChatId,
}

/// Status and body text of a completed HTTP exchange.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// The seam between the session logic and the network. `HttpTransport` is
/// the real thing; tests substitute a scripted implementation.
pub trait Transport {
    /// Issue `method path` with an optional JSON body. Paths are absolute
    /// (`/chats`), the transport owns the base URL and any session cookies.
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse>;
}

/// reqwest-backed transport. The cookie store is what keeps the login
/// session alive across calls.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        // reqwest's blocking client defaults to a 30s timeout; calls here
        // wait until the server answers or the connection fails.
        let client = Client::builder()
            .cookie_store(true)
            .timeout(None::<Duration>)
            .build()?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(b) = body {
            req = req.json(b);
        }
        let res = req.send()?;
        let status = res.status();
        let body = res.text()?;
        Ok(RawResponse { status, body })
    }
}

/// Fail on non-2xx, otherwise hand back the body text.
fn check(method: &Method, path: &str, res: RawResponse) -> Result<String> {
    debug!(%method, path, status = %res.status, "response");
    if !res.status.is_success() {
        return Err(ApiError::Status {
            status: res.status,
            body: res.body,
        });
    }
    Ok(res.body)
}

/// Unauthenticated client. The only thing it can do is log in.
pub struct ApiClient<T: Transport> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        ApiClient { transport }
    }

    /// POST the credentials to `/login/google-password`. On success the
    /// transport (and its cookies) moves into the returned `Session`.
    pub fn login(self, creds: &Credentials) -> Result<Session<T>> {
        let method = Method::POST;
        let path = "/login/google-password";
        debug!(email = %creds.email, "logging in");
        let body = json!({ "email": creds.email, "password": creds.password });
        let res = self.transport.request(method.clone(), path, Some(&body))?;
        check(&method, path, res)?;
        Ok(Session {
            transport: self.transport,
            email: creds.email.clone(),
        })
    }
}

/// Authenticated session. Each call is independent; the only shared state
/// is whatever the transport keeps between requests.
pub struct Session<T: Transport> {
    transport: T,
    email: String,
}

impl<T: Transport> Session<T> {
    /// Address the session was opened for.
    pub fn email(&self) -> &str {
        &self.email
    }

    fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<String> {
        let res = self.transport.request(method.clone(), path, body.as_ref())?;
        check(&method, path, res)
    }

    fn call_json<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<R> {
        let text = self.call(method, path, body)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `GET /chats`, in server order.
    pub fn list_chats(&self) -> Result<Vec<Chat>> {
        self.call_json(Method::GET, "/chats", None)
    }

    /// `POST /chats`, returning the id the server assigned.
    pub fn create_chat(&self, name: &str) -> Result<ChatId> {
        let created: CreatedChat =
            self.call_json(Method::POST, "/chats", Some(json!({ "name": name })))?;
        Ok(created.id)
    }

    /// `POST /chats/{id}/messages`. The response body is ignored.
    pub fn send_message(&self, chat_id: &ChatId, text: &str) -> Result<()> {
        let path = format!("/chats/{}/messages", chat_id);
        self.call(Method::POST, &path, Some(json!({ "message": text })))?;
        Ok(())
    }

    /// `GET /chats/{id}/messages`, in server order.
    pub fn get_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>> {
        let path = format!("/chats/{}/messages", chat_id);
        self.call_json(Method::GET, &path, None)
    }
}
