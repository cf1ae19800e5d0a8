// Command-line surface. Flags fall back to environment variables through
// clap's `env` support, so the precedence is flag > env > interactive.

use clap::Parser;

use crate::api::{ChatId, DEFAULT_BASE_URL};
use crate::ui::SessionOptions;

#[derive(Parser, Debug)]
#[command(name = "lambda-chat")]
#[command(version, about = "Lambda Chat CLI client")]
#[command(long_about = r#"
A command-line interface for interacting with Lambda Chat.

If no chat ID is provided, a list of existing chats is displayed and you can
select one (or create a new one) to interact with.

Examples:
  lambda-chat --email user@example.com
  lambda-chat --chat-id 1234567890

Environment variables:
  LAMBDA_CHAT_EMAIL     Email address
  LAMBDA_CHAT_URL       Service base URL

Interactive commands:
  /quit                 Quit the interactive chat session
"#)]
pub struct Cli {
    /// Email address to log in with
    #[arg(long, env = "LAMBDA_CHAT_EMAIL", value_name = "EMAIL")]
    pub email: Option<String>,

    /// Chat to open directly, skipping the selection menu
    #[arg(long, value_name = "CHAT_ID")]
    pub chat_id: Option<String>,

    /// Base URL of the chat service
    #[arg(long, env = "LAMBDA_CHAT_URL", value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            email: self.email.clone(),
            chat_id: self.chat_id.clone().map(ChatId::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_to_session_options() {
        let cli = Cli::try_parse_from([
            "lambda-chat",
            "--email",
            "me@example.com",
            "--chat-id",
            "1234567890",
            "--base-url",
            "http://localhost:8080",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.base_url, "http://localhost:8080");
        assert_eq!(cli.verbose, 2);

        let opts = cli.session_options();
        assert_eq!(opts.email.as_deref(), Some("me@example.com"));
        assert_eq!(opts.chat_id, Some(ChatId::from("1234567890")));
    }

    #[test]
    fn chat_id_is_optional() {
        let cli = Cli::try_parse_from(["lambda-chat", "--email", "me@example.com"]).unwrap();
        assert!(cli.session_options().chat_id.is_none());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["lambda-chat", "--password", "x"]).is_err());
    }
}
