// Scripted stand-ins for the network and the terminal, shared by the unit
// tests of `api` and `ui`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::TcpListener;
use std::rc::Rc;

use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::api::{RawResponse, Transport};
use crate::error::{ApiError, Result};
use crate::ui::Prompter;

/// One request as seen by `MockTransport`.
#[derive(Clone, Debug)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<RawResponse>>,
    calls: Vec<Call>,
}

/// Replays queued responses in order and records every request. Clones
/// share state so a test can keep a handle after moving one into a client.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: StatusCode, body: &str) {
        self.state.borrow_mut().responses.push_back(Ok(RawResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Queue a transport failure: the request never gets a response.
    pub fn push_network_error(&self) {
        self.state
            .borrow_mut()
            .responses
            .push_back(Err(connection_refused()));
    }

    pub fn push_ok(&self, body: &str) {
        self.push(StatusCode::OK, body);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.state.borrow().calls.iter().map(|c| c.path.clone()).collect()
    }
}

impl Transport for MockTransport {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| panic!("no response queued for {}", path))
    }
}

/// A genuine `reqwest::Error` from connecting to a port nobody listens on.
pub fn connection_refused() -> ApiError {
    let addr = TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .unwrap();
    let err = reqwest::blocking::get(format!("http://{}/", addr))
        .err()
        .expect("nothing should be listening");
    ApiError::Http(err)
}

/// Answers prompts from a fixed script and remembers what was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub busy: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            prompts: Vec::new(),
            busy: Vec::new(),
        }
    }

    fn next(&mut self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted at prompt {:?}", prompt))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str) -> anyhow::Result<String> {
        self.next(prompt)
    }

    fn password(&mut self, prompt: &str) -> anyhow::Result<String> {
        self.next(prompt)
    }

    fn busy(&mut self, message: &str) -> Box<dyn FnOnce()> {
        self.busy.push(message.to_string());
        Box::new(|| {})
    }
}
