use std::rc::Rc;

use clap::{Parser, Subcommand};
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

use shortcut_tickets::cmd::config::{self as config_cmd, ConfigArgs};
use shortcut_tickets::cmd::insert::{self, InsertArgs};
use shortcut_tickets::cmd::render::{self, RenderArgs};
use shortcut_tickets::cmd::scan::{self, ScanArgs};
use shortcut_tickets::config::{Settings, settings_file_path};
use shortcut_tickets::context::PluginContext;
use shortcut_tickets::error::AppResult;
use shortcut_tickets::infra::http::ReqwestTransport;
use shortcut_tickets::workflow::note::RenderedNote;

#[derive(Parser)]
#[command(
    name = "sct",
    author,
    version,
    about = "Render Shortcut ticket references in notes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note to HTML with live ticket widgets.
    Render(RenderArgs),
    /// List ticket references in a note without fetching anything.
    Scan(ScanArgs),
    /// Insert an empty ticket block into a note.
    Insert(InsertArgs),
    /// Manage stored settings.
    Config(ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let local = LocalSet::new();

    match local.run_until(run(cli)).await {
        Ok(Some(note)) => {
            // Let in-flight ticket fetches settle before printing.
            local.await;
            println!("{}", note.to_html());
        }
        Ok(None) => {}
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> AppResult<Option<RenderedNote>> {
    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(None)
        }
        Commands::Scan(args) => {
            scan::run(args)?;
            Ok(None)
        }
        Commands::Insert(args) => {
            insert::run(args)?;
            Ok(None)
        }
        Commands::Render(args) => run_render(args).await.map(Some),
    }
}

async fn run_render(args: RenderArgs) -> AppResult<RenderedNote> {
    let settings = Settings::load()?;
    if settings.api_token().is_empty() {
        eprintln!("Warning: Shortcut API token not configured; run `sct config init`.");
    }

    let ctx = PluginContext::load(settings, settings_file_path()?, Rc::new(ReqwestTransport::new()));
    render::run(&ctx, args).await
}
