// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) parses flags and hands control to `ui::run`.
//
// Module responsibilities:
// - `api`: HTTP interactions with the chat service (login, chats,
//   messages) behind a `Transport` trait.
// - `ui`: the interactive session flow; delegates requests to `api` and
//   decides how failures are shown.
// - `cli`, `logging`, `error`: flags, tracing setup and error types.
pub mod api;
pub mod cli;
pub mod error;
pub mod logging;
pub mod ui;

#[cfg(test)]
mod testing;
