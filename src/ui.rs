// UI layer: the interactive session. Prompts go through the `Prompter`
// trait (dialoguer in the terminal, a script in tests) and everything the
// user reads is written to a caller-supplied `Write`, so the flows below
// can be driven end to end without a terminal or a network.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::api::{ApiClient, ChatId, Credentials, Message, Session, Transport};

/// Typing this (any casing) at the message prompt ends the session.
pub const QUIT_COMMAND: &str = "/quit";

/// How many of the most recent messages are shown after each send.
pub const HISTORY_TAIL: usize = 5;

/// Source of user input.
pub trait Prompter {
    /// Read a visible line of text.
    fn input(&mut self, prompt: &str) -> Result<String>;
    /// Read a line without echoing it.
    fn password(&mut self, prompt: &str) -> Result<String>;
    /// Show that a request is in flight; calling the returned closure
    /// clears the indicator.
    fn busy(&mut self, message: &str) -> Box<dyn FnOnce()>;
}

/// `Prompter` backed by dialoguer prompts and an indicatif spinner.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        // `allow_empty` so an empty line is handed back instead of swallowed.
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(line)
    }

    fn password(&mut self, prompt: &str) -> Result<String> {
        Ok(Password::new().with_prompt(prompt).interact()?)
    }

    fn busy(&mut self, message: &str) -> Box<dyn FnOnce()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Box::new(move || spinner.finish_and_clear())
    }
}

/// What the command line already decided for us.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub email: Option<String>,
    pub chat_id: Option<ChatId>,
}

/// Full interactive session: credentials, login, chat pick, message loop.
/// A failed login is returned as an error before any chat request is made.
pub fn run<T, P, W>(
    client: ApiClient<T>,
    opts: SessionOptions,
    prompter: &mut P,
    out: &mut W,
) -> Result<()>
where
    T: Transport,
    P: Prompter,
    W: Write,
{
    let email = resolve_email(opts.email, prompter)?;
    let password = prompter.password("Enter your Google password")?;
    let creds = Credentials::new(email, password);

    let session = {
        let done = prompter.busy("Logging in...");
        let result = client.login(&creds);
        done();
        result.context("Login failed")?
    };
    info!(email = %session.email(), "logged in");

    let chat_id = match opts.chat_id {
        Some(id) => id,
        None => select_chat(&session, prompter, out)?,
    };

    chat_loop(&session, &chat_id, prompter, out)
}

/// Email from the flag/env value if it is non-blank, otherwise asked for
/// until something non-blank is typed.
pub fn resolve_email<P: Prompter>(explicit: Option<String>, prompter: &mut P) -> Result<String> {
    if let Some(email) = explicit.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()) {
        return Ok(email);
    }
    loop {
        let email = prompter.input("Enter your email address")?;
        let email = email.trim();
        if !email.is_empty() {
            return Ok(email.to_string());
        }
    }
}

/// Numbered menu of existing chats with "create new" as entry 1. Invalid
/// input re-prompts; a failed creation reports the error and re-prompts
/// too, so the returned id always refers to a real chat.
pub fn select_chat<T, P, W>(session: &Session<T>, prompter: &mut P, out: &mut W) -> Result<ChatId>
where
    T: Transport,
    P: Prompter,
    W: Write,
{
    let chats = match session.list_chats() {
        Ok(chats) => chats,
        Err(e) => {
            warn!(error = %e, "listing chats failed");
            writeln!(out, "Failed to retrieve chats: {}", e)?;
            Vec::new()
        }
    };

    writeln!(out, "Select a chat:")?;
    writeln!(out, "1. Create a new chat")?;
    for (i, chat) in chats.iter().enumerate() {
        writeln!(out, "{}. {} ({})", i + 2, chat.name, chat.id)?;
    }

    loop {
        let choice: usize = match prompter.input(">")?.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                writeln!(out, "Invalid input. Please try again.")?;
                continue;
            }
        };

        if choice == 1 {
            let name = prompter.input("Enter a name for the new chat")?;
            match session.create_chat(&name) {
                Ok(id) => return Ok(id),
                Err(e) => {
                    warn!(error = %e, "creating chat failed");
                    writeln!(out, "Failed to create chat: {}", e)?;
                }
            }
        } else if (2..=chats.len() + 1).contains(&choice) {
            return Ok(chats[choice - 2].id.clone());
        } else {
            writeln!(out, "Invalid choice. Please try again.")?;
        }
    }
}

/// Read-send-print loop until the quit command.
pub fn chat_loop<T, P, W>(
    session: &Session<T>,
    chat_id: &ChatId,
    prompter: &mut P,
    out: &mut W,
) -> Result<()>
where
    T: Transport,
    P: Prompter,
    W: Write,
{
    writeln!(out, "Starting interactive chat session in chat {}...", chat_id)?;
    loop {
        let line = prompter.input(">")?;
        if is_quit(&line) {
            break;
        }

        let done = prompter.busy("Sending...");
        let sent = session.send_message(chat_id, &line);
        done();
        match sent {
            Ok(()) => {
                info!(chat = %chat_id, "message sent");
                writeln!(out, "Message sent successfully")?;
            }
            Err(e) => {
                warn!(chat = %chat_id, error = %e, "sending message failed");
                writeln!(out, "Failed to send message: {}", e)?;
            }
        }

        let messages = match session.get_messages(chat_id) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(chat = %chat_id, error = %e, "fetching messages failed");
                writeln!(out, "Failed to retrieve messages: {}", e)?;
                Vec::new()
            }
        };
        for msg in last_messages(&messages, HISTORY_TAIL) {
            writeln!(out, "{}: {}", msg.from, msg.message)?;
        }
    }
    Ok(())
}

/// Exact match, ignoring case only: " /quit" is an ordinary message.
pub fn is_quit(line: &str) -> bool {
    line.eq_ignore_ascii_case(QUIT_COMMAND)
}

/// The trailing `n` messages, oldest first.
pub fn last_messages(messages: &[Message], n: usize) -> &[Message] {
    &messages[messages.len().saturating_sub(n)..]
}
