use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    catalog,
    forms::{account, contact, prediction},
    FormController, HttpTransport, Transport,
};
use shared::domain::RawFields;
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, Settings};
use terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(name = "dealscout", version, about = "Submit contact and deal-prediction forms")]
struct Cli {
    /// Server base URL (overrides config and environment)
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Config file (default: dealscout.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Predict the best discount for a category and budget
    Predict {
        #[arg(long)]
        category: String,
        #[arg(long)]
        budget: String,
        /// Preferred platform; omitted lets the server pick one
        #[arg(long)]
        platform: Option<String>,
        /// Sign in first with this email
        #[arg(long, requires = "password")]
        email: Option<String>,
        #[arg(long, requires = "email")]
        password: Option<String>,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List product categories known to the server
    Categories,
    /// List shopping platforms known to the server
    Platforms,
}

fn fields(pairs: &[(&str, Option<&str>)]) -> RawFields {
    pairs
        .iter()
        .filter_map(|(name, value)| value.map(|value| (name.to_string(), value.to_string())))
        .collect()
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        _ => "debug",
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn submit(form: &FormController, raw: &RawFields) -> bool {
    let outcome = form.submit(raw).await;
    tracing::debug!(form = form.definition().name, ?outcome, "cli: form settled");
    outcome.is_success()
}

async fn run(cli: Cli, settings: Settings) -> Result<bool> {
    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(&settings.server_url, settings.request_timeout)
            .context("failed to build HTTP transport")?,
    );
    let timings = settings.timings;

    let succeeded = match cli.command {
        Command::Contact {
            name,
            email,
            message,
        } => {
            let surface = Arc::new(TerminalSurface::new("Send Message"));
            let form = contact::controller(transport, surface).with_timings(timings);
            submit(
                &form,
                &fields(&[
                    ("name", Some(name.as_str())),
                    ("email", Some(email.as_str())),
                    ("message", Some(message.as_str())),
                ]),
            )
            .await
        }
        Command::Predict {
            category,
            budget,
            platform,
            email,
            password,
        } => {
            if let (Some(email), Some(password)) = (email, password) {
                let surface = Arc::new(TerminalSurface::new("Sign In"));
                let login =
                    account::login_controller(transport.clone(), surface).with_timings(timings);
                let raw = fields(&[
                    ("email", Some(email.as_str())),
                    ("password", Some(password.as_str())),
                ]);
                if !submit(&login, &raw).await {
                    return Ok(false);
                }
            }

            let surface = Arc::new(TerminalSurface::new("Find Best Deals").with_labels(&[
                (prediction::DISCOUNT_VALUE, "Predicted discount"),
                (prediction::PLATFORM_BADGE, "Best platform"),
                (prediction::CONFIDENCE_VALUE, "Confidence"),
                (prediction::ORIGINAL_PRICE, "Estimated price"),
                (prediction::DISCOUNTED_PRICE, "Discounted price"),
                (prediction::SAVINGS_AMOUNT, "Savings"),
                (prediction::MODEL_NAME, "Model"),
                (prediction::RECOMMENDATIONS_LIST, "Recommendations"),
            ]));
            let form = prediction::controller(transport, surface).with_timings(timings);
            submit(
                &form,
                &fields(&[
                    ("category", Some(category.as_str())),
                    ("budget", Some(budget.as_str())),
                    ("platform", platform.as_deref()),
                ]),
            )
            .await
        }
        Command::Login {
            email,
            password,
            remember,
        } => {
            let surface = Arc::new(TerminalSurface::new("Sign In").with_labels(&[(
                account::SIGNED_IN_USER,
                "Signed in as",
            )]));
            let form = account::login_controller(transport, surface).with_timings(timings);
            let remember = remember.to_string();
            submit(
                &form,
                &fields(&[
                    ("email", Some(email.as_str())),
                    ("password", Some(password.as_str())),
                    ("remember", Some(remember.as_str())),
                ]),
            )
            .await
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let surface = Arc::new(TerminalSurface::new("Sign Up"));
            let form = account::signup_controller(transport, surface).with_timings(timings);
            submit(
                &form,
                &fields(&[
                    ("name", Some(name.as_str())),
                    ("email", Some(email.as_str())),
                    ("password", Some(password.as_str())),
                ]),
            )
            .await
        }
        Command::Categories => print_options(catalog::fetch_categories(transport.as_ref()).await),
        Command::Platforms => print_options(catalog::fetch_platforms(transport.as_ref()).await),
    };

    Ok(succeeded)
}

fn print_options(result: Result<Vec<String>, client_core::SubmitError>) -> bool {
    match result {
        Ok(options) => {
            for option in options {
                println!("{option}");
            }
            true
        }
        Err(err) => {
            eprintln!(
                "error: {}",
                err.user_message(&client_core::FailureMessages::default())
            );
            false
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(server_url) = &cli.server_url {
        settings.server_url = server_url.clone();
    }
    tracing::info!(server_url = %settings.server_url, "cli: using server");

    if run(cli, settings).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
