// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging, build the transport
//   and hand everything to the interactive session.
// - A failed login (or a broken terminal) surfaces as an `Err` here and
//   exits with status 1.

use clap::Parser;
use lambda_chat_cli::api::{ApiClient, HttpTransport};
use lambda_chat_cli::cli::Cli;
use lambda_chat_cli::{logging, ui};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let transport = HttpTransport::new(&cli.base_url)?;
    tracing::debug!(base_url = transport.base_url(), "starting");

    let mut prompter = ui::TerminalPrompter;
    let mut stdout = std::io::stdout();
    if let Err(e) = ui::run(
        ApiClient::new(transport),
        cli.session_options(),
        &mut prompter,
        &mut stdout,
    ) {
        // `{:#}` flattens the context chain: "Login failed: server returned 401 ..."
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
