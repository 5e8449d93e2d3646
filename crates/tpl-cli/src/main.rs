//! `tplctl`: inspect and delete templates on a platform deployment
//!
//! Configuration is resolved from defaults, then `--config`, then `TPL_URL` /
//! `TPL_SESSION_TOKEN`, then the `--url` / `--token` / `--timeout` flags.
//! Logs go to stderr and follow `RUST_LOG` (default `info`).

mod render;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tpl_client::{ClientConfig, HttpTemplateApi, Notifier};
use tpl_core::{ControllerConfig, PageEvent, PageState, PageStatus, TemplatePageController};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::render::PageView;

type Page = TemplatePageController<HttpTemplateApi, ConsoleNotifier>;

/// Prints success notifications to stdout
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        println!("{message}");
    }
}

fn cli() -> Command {
    let target = || {
        [
            Arg::new("organization")
                .required(true)
                .help("Organization ID the template belongs to"),
            Arg::new("template")
                .required(true)
                .help("Template name"),
        ]
    };

    Command::new("tplctl")
        .version(tpl_core::VERSION)
        .about("Inspect and delete templates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("url")
                .long("url")
                .global(true)
                .help("Deployment URL (overrides TPL_URL)"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .help("Session token (overrides TPL_SESSION_TOKEN)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with client settings"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Per-request timeout in seconds"),
        )
        .subcommand(
            Command::new("show")
                .about("Load a template page and print it")
                .args(target())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a template after confirmation")
                .args(target())
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
}

fn client_config(
    matches: &ArgMatches,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    };

    let mut config = config.with_overrides_from(lookup);
    if let Some(url) = matches.get_one::<String>("url") {
        config.base_url = url.clone();
    }
    if let Some(token) = matches.get_one::<String>("token") {
        config.session_token = Some(token.clone());
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        config.timeout_secs = Some(*secs);
    }
    Ok(config)
}

fn open_page(config: ClientConfig, args: &ArgMatches) -> Result<Page> {
    let api = HttpTemplateApi::new(config).context("invalid client configuration")?;
    let (organization, template) = match (
        args.get_one::<String>("organization"),
        args.get_one::<String>("template"),
    ) {
        (Some(organization), Some(template)) => (organization, template),
        _ => bail!("organization and template are required"),
    };

    let page = TemplatePageController::new(
        Arc::new(api),
        Arc::new(ConsoleNotifier),
        organization.as_str(),
        template.as_str(),
        &ControllerConfig::new(),
    );

    let token = page.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            token.cancel();
        }
    });
    Ok(page)
}

/// Load the page, reporting a fetch failure on stderr
async fn load(page: &mut Page) -> Result<bool> {
    match page.load().await? {
        PageStatus::Loaded => Ok(true),
        _ => {
            if let PageState::Failed(failure) = page.state() {
                eprintln!("error: {failure}");
                if let Some(detail) = failure.error.detail() {
                    eprintln!("  {detail}");
                }
            }
            Ok(false)
        }
    }
}

async fn show(mut page: Page, args: &ArgMatches) -> Result<ExitCode> {
    if !load(&mut page).await? {
        return Ok(ExitCode::FAILURE);
    }

    if args.get_flag("json") {
        let json = serde_json::to_string_pretty(page.context())?;
        println!("{json}");
    } else {
        print!("{}", PageView(page.context()));
    }
    Ok(ExitCode::SUCCESS)
}

async fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn delete(mut page: Page, args: &ArgMatches) -> Result<ExitCode> {
    if !load(&mut page).await? {
        return Ok(ExitCode::FAILURE);
    }
    page.send(PageEvent::Delete).await?;

    let confirmed = args.get_flag("yes") || {
        let template = page.context().require_template()?;
        let prompt = format!(
            "Delete template {} ({} developer(s) use it)? [y/N] ",
            template.name, template.workspace_owner_count
        );
        confirm(&prompt).await?
    };

    if !confirmed {
        page.send(PageEvent::CancelDelete).await?;
        println!("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    match page.send(PageEvent::ConfirmDelete).await? {
        PageStatus::Deleted => Ok(ExitCode::SUCCESS),
        status => {
            match page.context().delete_error() {
                Some(error) => {
                    eprintln!("error: failed to delete template: {error}");
                    if let Some(detail) = error.detail() {
                        eprintln!("  {detail}");
                    }
                }
                None => eprintln!("error: delete ended in state {status}"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    let config = client_config(&matches, |key| std::env::var(key).ok())?;

    match matches.subcommand() {
        Some(("show", args)) => show(open_page(config, args)?, args).await,
        Some(("delete", args)) => delete(open_page(config, args)?, args).await,
        _ => Ok(ExitCode::FAILURE),
    }
}
