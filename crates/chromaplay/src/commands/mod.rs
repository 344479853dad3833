//! Command handlers, one module per top-level subcommand.

pub mod call;
pub mod collections;
pub mod config_cmd;
pub mod methods;
pub mod shell;
pub mod util;

use clap::CommandFactory;

use chromaplay_core::ApiClient;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;

pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match cmd {
        // Offline: registry browsing, config management, completions
        Command::Methods(args) => methods::handle(&args, global),
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "chromaplay", &mut std::io::stdout());
            Ok(())
        }

        // Everything else needs a server
        Command::Call(args) => {
            let session = config::resolve_session(global, cfg)?;
            let client = util::connect(session.options, session.update, &session.profile_name).await?;
            call::handle(args, &client, global, &session.profile_name).await
        }
        Command::Collections(args) => {
            let session = config::resolve_session(global, cfg)?;
            let client = util::connect(session.options, session.update, &session.profile_name).await?;
            collections::handle(&args, &client, global, &session.profile_name).await
        }
        Command::Shell => {
            let session = config::resolve_session(global, cfg)?;
            let client = ApiClient::new(session.options)?;
            shell::run(client, session.update, &session.profile_name, global).await
        }
    }
}
