// command line interface

use crate::tui::Session;
use crate::{
    Backend, ChatStore, DEFAULT_DB_URL, DEFAULT_GATEWAY_URL, DEFAULT_MODEL, DEFAULT_SERVER_URL,
    Error, GatewayConfig, Relay, RelayClient, Server,
};
use clap::{Parser, Subcommand};
use miette::Result;

#[derive(Parser)]
#[command(name = "lumacalm", about = "A calm place to talk things through")]
struct Cli {
    /// api key for the ai gateway
    #[arg(long, short = 'k', env = "LOVABLE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// chat completions endpoint
    #[arg(long, env = "LUMACALM_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL, global = true)]
    gateway_url: String,

    /// model identifier sent to the gateway
    #[arg(long, short, env = "LUMACALM_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// who is chatting (required for the chat client)
    #[arg(long, short, env = "LUMACALM_USER")]
    user: Option<String>,

    /// relay server to talk to
    #[arg(long, short, env = "LUMACALM_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// run the relay in-process instead of calling a server
    #[arg(long)]
    local: bool,

    /// database for chat history
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DB_URL)]
    db: String,

    /// don't save or load chat history
    #[arg(long)]
    no_store: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// start as http server
    Serve {
        /// port number
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

impl Cli {
    fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            api_key: self.api_key.clone(),
            url: self.gateway_url.clone(),
            model: self.model.clone(),
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, ref host }) => {
            init_tracing();
            Ok(Server::run(cli.gateway(), host, port).await?)
        }

        None => {
            // no user, no chat
            let user = cli.user.clone().ok_or(Error::NotSignedIn)?;

            let backend = if cli.local {
                Backend::Local(Relay::new(cli.gateway()))
            } else {
                Backend::Remote(RelayClient::new(&cli.server))
            };

            let store = if cli.no_store {
                None
            } else {
                Some(ChatStore::connect(&cli.db).await?)
            };

            Ok(crate::tui::run(Session::new(user), backend, store).await?)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
