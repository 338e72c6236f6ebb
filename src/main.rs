use anyhow::Result;
use clap::Parser;
use par_chat::cli::{self, Cli};
use par_chat::context::ChatContext;
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Routes all log::info!() etc. to /tmp/par_chat_debug.log.
    // CLI --log-level takes precedence over DEBUG_LEVEL.
    par_chat::debug::init_log_bridge(cli.log_level.map(Into::into));

    log::info!("Starting par-chat {}", par_chat::VERSION);

    let ctx = ChatContext::open(cli.settings.as_deref())?;
    let stdout = io::stdout();
    let stdin = io::stdin();
    let result = cli::execute(cli.command, &ctx, &mut stdout.lock(), &mut stdin.lock());

    if let Err(ref e) = result {
        log::error!("par-chat: {e:#}");
    }
    result
}
