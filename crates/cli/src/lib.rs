pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use dealdesk_client::RestClient;
use dealdesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};

use commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "dealdesk",
    about = "Dealdesk operator CLI",
    long_about = "Resolve customer quotations, drive the quotation stage workflow, generate invoices, and inspect the dashboard and effective configuration.",
    after_help = "Examples:\n  dealdesk quotations resolve --email ada@example.com --customer-id 42\n  dealdesk quotations send --id 7\n  dealdesk invoice from-quotation --id 7\n  dealdesk config"
)]
pub struct Cli {
    /// Path to an explicit config file instead of the default lookup.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the API base URL for this invocation.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the log level for this invocation.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Look up and act on customer quotations")]
    Quotations {
        #[command(subcommand)]
        command: QuotationsCommand,
    },
    #[command(about = "Invoice generation")]
    Invoice {
        #[command(subcommand)]
        command: InvoiceCommand,
    },
    #[command(about = "Fetch the dashboard snapshot with a single delayed retry")]
    Dashboard,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

#[derive(Debug, Subcommand)]
pub enum QuotationsCommand {
    #[command(about = "Resolve quotations by email with customer-id fallback")]
    Resolve {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        customer_id: Option<u64>,
    },
    #[command(about = "Show the quotation attached to an opportunity, if any")]
    Show {
        #[arg(long)]
        opportunity_id: u64,
    },
    #[command(about = "Transition a draft quotation to SENT")]
    Send {
        #[arg(long)]
        id: u64,
    },
    #[command(about = "Transition a sent quotation to ACCEPTED")]
    Accept {
        #[arg(long)]
        id: u64,
    },
    #[command(about = "Transition a sent quotation to REJECTED")]
    Reject {
        #[arg(long)]
        id: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    #[command(about = "Generate an invoice from an accepted quotation")]
    FromQuotation {
        #[arg(long)]
        id: u64,
    },
}

fn init_logging(config: &AppConfig) {
    use dealdesk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        auth_token: None,
        log_level: cli.log_level.clone(),
    };
    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        require_file: false,
        overrides,
    }) {
        Ok(config) => config,
        Err(error) => {
            let result =
                CommandResult::failure("config", "config_validation", error.to_string(), 2);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let result = dispatch(cli, &config).await;
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

async fn dispatch(cli: Cli, config: &AppConfig) -> CommandResult {
    // The config command never touches the network; handle it before
    // constructing a client.
    if matches!(cli.command, Command::Config) {
        return CommandResult {
            exit_code: 0,
            output: commands::config::run(cli.config.as_deref()),
        };
    }

    let client = match RestClient::from_config(&config.api) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure("client", "transport", error.to_string(), 1);
        }
    };

    match cli.command {
        Command::Quotations { command } => match command {
            QuotationsCommand::Resolve { email, customer_id } => {
                commands::quotations::resolve(&client, email, customer_id).await
            }
            QuotationsCommand::Show { opportunity_id } => {
                commands::quotations::show(&client, opportunity_id).await
            }
            QuotationsCommand::Send { id } => commands::quotations::send(&client, id).await,
            QuotationsCommand::Accept { id } => commands::quotations::accept(&client, id).await,
            QuotationsCommand::Reject { id } => commands::quotations::reject(&client, id).await,
        },
        Command::Invoice { command } => match command {
            InvoiceCommand::FromQuotation { id } => {
                commands::invoice::from_quotation(&client, id).await
            }
        },
        Command::Dashboard => {
            let delay = std::time::Duration::from_millis(config.dashboard.retry_delay_ms);
            commands::dashboard::run(&client, delay).await
        }
        Command::Config => unreachable!("handled before client construction"),
    }
}
