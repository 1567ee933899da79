//! tchaik CLI tool
//!
//! Browses a collection stored as JSON through the same client stack the browser uses: views
//! mount against an [AppContext], requests go to an in-process [LoopbackServer], and the
//! responses are pumped back through the dispatcher.
//!
//! ## Commands
//!
//! - `browse <library> [segments...]`: Show one group and its children
//! - `search <library> <query>`: Show the items whose name matches `query`

use clap::{Parser, Subcommand};
use std::{fs::read_to_string, path::PathBuf, sync::Arc};
use tchaik_core::{
    config::{ClientConfig, ConfigProvider, TomlConfigProvider},
    context::AppContext,
    paths::CollectionPath,
    transport::{ChannelTransport, LoopbackServer},
    views::{Component, Rendered, RootGroup, Search},
    wire::OutboundMessage,
    TchaikError,
};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Parser)]
#[command(name = "tchaik")]
#[command(author, version, about = "Browse a music collection through the tchaik client cache", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the group at a path and list its children
    Browse {
        /// JSON file holding the library tree
        library: PathBuf,

        /// Path segments below the root; defaults to the configured root
        segments: Vec<String>,

        /// Also show every group below the path
        #[arg(short, long)]
        recursive: bool,
    },

    /// Search the library by name
    Search {
        /// JSON file holding the library tree
        library: PathBuf,

        /// Case-insensitive substring to look for
        query: String,
    },
}

/// Answer every queued request and feed the replies back in.
fn pump(
    server: &LoopbackServer,
    ctx: &AppContext,
    requests: &mut UnboundedReceiver<OutboundMessage>,
) -> Result<usize, TchaikError> {
    let mut answered = 0;
    while let Ok(request) = requests.try_recv() {
        if let Some(reply) = server.respond(&request) {
            ctx.receive(reply)?;
            answered += 1;
        }
    }
    Ok(answered)
}

fn print_group(
    server: &LoopbackServer,
    ctx: &AppContext,
    requests: &mut UnboundedReceiver<OutboundMessage>,
    path: CollectionPath,
    indent: usize,
    recursive: bool,
) -> Result<(), TchaikError> {
    let mut view = RootGroup::new(ctx.collections(), path.clone());
    view.mount();
    pump(server, ctx, requests)?;

    let pad = "  ".repeat(indent);
    match view.render() {
        Rendered::Group { item, children, .. } => {
            match item.track() {
                Some(track) => println!("{pad}{track}"),
                None => println!("{pad}{}/", item.name()),
            }
            for child in children {
                if recursive {
                    print_group(server, ctx, requests, child, indent + 1, recursive)?;
                } else {
                    println!("{pad}  {}", child.last());
                }
            }
        }
        _ => {
            return Err(TchaikError::NotFound(format!("no collection at {path}")));
        }
    }
    view.unmount();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TomlConfigProvider::new(path.clone()).get_config()?,
        None => ClientConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Browse {
            library,
            segments,
            recursive,
        } => {
            let server = LoopbackServer::from_json(&read_to_string(&library)?)?;
            let (transport, mut requests) = ChannelTransport::new();
            let ctx = AppContext::new(Arc::new(transport));

            let path = if segments.is_empty() {
                config.root.clone()
            } else {
                segments
                    .into_iter()
                    .fold(config.root.clone(), |path, segment| path.child(segment))
            };
            tracing::debug!("browsing {path}");
            print_group(&server, &ctx, &mut requests, path, 0, recursive)?;
            Ok(())
        }

        Commands::Search { library, query } => {
            let server = LoopbackServer::from_json(&read_to_string(&library)?)?;
            let (transport, mut requests) = ChannelTransport::new();
            let ctx = AppContext::new(Arc::new(transport));

            let mut view = Search::new(ctx.search_store());
            view.mount();
            ctx.search(&query)?;
            pump(&server, &ctx, &mut requests)?;

            match view.render() {
                Rendered::Collection(inner) => match *inner {
                    Rendered::GroupList { list, .. } => {
                        for item in list.iter() {
                            match item.track() {
                                Some(track) => println!("{track}"),
                                None => println!("{}/", item.name()),
                            }
                        }
                    }
                    _ => println!("No results for '{query}'"),
                },
                other => tracing::warn!("unexpected search render: {other:?}"),
            }
            Ok(())
        }
    }
}
