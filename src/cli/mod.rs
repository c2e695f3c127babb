//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod account;
pub mod say;
pub mod settings;

use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::{ApiClient, ConversationId};
use crate::cli::account::{prompt_credentials, run_login, run_logout, run_register, run_status};
use crate::cli::say::{run_history, run_say};
use crate::cli::settings::SettingRegistry;
use crate::core::config::Config;
use crate::core::session::SessionManager;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_logging;

#[derive(Parser)]
#[command(name = "minimind-chat")]
#[command(version)]
#[command(about = "A terminal client for the MiniMind chat server")]
#[command(
    long_about = "MiniMind Chat is a full-screen terminal client for a MiniMind chat server. \
Log in or register, then chat; conversations are listed in the sidebar.\n\n\
Environment Variables:\n\
  MINIMIND_API_URL  Server base URL (overridden by --api-url, defaults to http://localhost:5000/api)\n\
  RUST_LOG          Log filter used with --log\n\n\
Controls:\n\
  Enter             Submit the form or send the message\n\
  Alt+Enter         Insert a newline in the message\n\
  Tab               Move between fields, or between the message box and the conversation list\n\
  Ctrl+T            Switch between the Login and Register tabs\n\
  Ctrl+N            Start a new chat\n\
  Ctrl+R            Reload the conversation list\n\
  Ctrl+L            Log out\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Write diagnostic logs to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Log in and store the session
    Login {
        /// Account email (prompted for when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account
    Register {
        /// Account email (prompted for when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// List past conversations
    History,
    /// Send one message and print the reply
    Say {
        /// Message text (multiple words are joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
        /// Continue an existing conversation
        #[arg(short, long, value_name = "ID")]
        conversation: Option<ConversationId>,
    },
    /// Set configuration values (prints the configuration when no value is given)
    Set {
        /// Configuration key to set (api-url, session-storage)
        key: Option<String>,
        /// Value to set for the key
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log.as_deref())?;

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let registry = SettingRegistry::new();
    let command = args.command.unwrap_or(Commands::Chat);

    // Settings commands work on the file directly so a broken config can be
    // repaired.
    match &command {
        Commands::Set { key, value } => {
            let path = Config::get_config_path()?;
            let key = key.as_deref().unwrap_or_default();
            let values: Vec<String> = value.iter().cloned().collect();
            match registry.set_in_file(&path, key, &values) {
                Ok(message) => println!("{message}"),
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
            return Ok(());
        }
        Commands::Unset { key } => {
            let path = Config::get_config_path()?;
            match registry.unset_in_file(&path, key) {
                Ok(message) => println!("{message}"),
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load()?;
    let api_url = config.resolve_api_url(args.api_url.as_deref());
    let storage = config.session_storage();
    let sessions = SessionManager::for_storage(storage)?;
    let mut stdout = io::stdout();

    match command {
        Commands::Chat => run_chat(api_url, sessions).await,
        Commands::Login { email } => {
            let Some(credentials) = prompt_credentials(email, false)? else {
                println!("Cancelled");
                return Ok(());
            };
            let client = ApiClient::new(&api_url)?;
            run_login(&client, &sessions, &credentials, &mut stdout).await
        }
        Commands::Register { email } => {
            let Some(credentials) = prompt_credentials(email, true)? else {
                println!("Cancelled");
                return Ok(());
            };
            let client = ApiClient::new(&api_url)?;
            run_register(&client, &credentials, &mut stdout).await
        }
        Commands::Logout => run_logout(&sessions, &mut stdout),
        Commands::Status => run_status(&sessions, storage, &api_url, &mut stdout),
        Commands::History => {
            let client = ApiClient::new(&api_url)?;
            run_history(&client, &sessions, &mut stdout).await
        }
        Commands::Say {
            message,
            conversation,
        } => {
            let client = ApiClient::new(&api_url)?;
            run_say(
                &client,
                &sessions,
                &message,
                conversation.as_ref(),
                &mut stdout,
            )
            .await
        }
        Commands::Set { .. } | Commands::Unset { .. } => Ok(()),
    }
}
