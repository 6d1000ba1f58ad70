//! YaCy Search CLI - latest-wins search against a YaCy peer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use yacy_search::{
    ChannelListener, NoopListener, Search, SearchConfig, SearchEvent, SearchItem, SearchListener,
    SearchOutcome, TcpProbe,
};

/// YaCy Search - streaming search client for YaCy peers
#[derive(Parser)]
#[command(name = "yacy-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single search and print the results
    Search(SearchArgs),

    /// Read queries from stdin; each line supersedes the previous search
    Watch(WatchArgs),
}

#[derive(Args)]
struct ConnectionArgs {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Search host, e.g. localhost:8090
    #[arg(long, global = true)]
    host: Option<String>,

    /// Path template containing {query}
    #[arg(long, global = true)]
    search_path: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, global = true)]
    connect_timeout: Option<u64>,

    /// Read timeout in seconds
    #[arg(long, global = true)]
    read_timeout: Option<u64>,

    /// Check that the host accepts TCP connections before each request
    #[arg(long, global = true)]
    check_host: bool,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results to display
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser)]
struct WatchArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let config = load_config(&cli.connection)?;

    match cli.command {
        Commands::Search(args) => run_search(config, cli.connection.check_host, args).await,
        Commands::Watch(args) => run_watch(config, cli.connection.check_host, args).await,
    }
}

fn load_config(args: &ConnectionArgs) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(path) = &args.search_path {
        config.search_path = Some(path.clone());
    }
    if let Some(secs) = args.connect_timeout {
        config.connect_timeout = secs;
    }
    if let Some(secs) = args.read_timeout {
        config.read_timeout = secs;
    }
    config.validate()?;
    Ok(config)
}

fn build_search(
    config: SearchConfig,
    listener: Arc<dyn SearchListener>,
    check_host: bool,
) -> Result<Search> {
    let search = Search::new(config, listener)?;
    Ok(if check_host {
        search.with_connectivity(TcpProbe::default())
    } else {
        search
    })
}

async fn run_search(config: SearchConfig, check_host: bool, args: SearchArgs) -> Result<()> {
    let search = build_search(config, Arc::new(NoopListener), check_host)?;

    match search.run(&args.query).await {
        SearchOutcome::Skipped => anyhow::bail!("Query is empty"),
        SearchOutcome::NetworkUnavailable => anyhow::bail!("Network unavailable"),
        SearchOutcome::Failed(e) => return Err(e.into()),
        SearchOutcome::Cancelled | SearchOutcome::Finished { .. } => {}
    }

    let results = search.results();
    match args.format {
        OutputFormat::Text => {
            println!(
                "\nSearch results for \"{}\" ({} results from {}):\n",
                args.query,
                results.len(),
                search.config().host
            );
            for (i, item) in results.iter().take(args.limit).enumerate() {
                print_item(i + 1, item);
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = results.iter().take(args.limit).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Compact => {
            for item in results.iter().take(args.limit) {
                println!("{}\t{}", item.title, item.link);
            }
        }
    }

    Ok(())
}

async fn run_watch(config: SearchConfig, check_host: bool, args: WatchArgs) -> Result<()> {
    let (listener, mut events) = ChannelListener::new();
    let search = build_search(config, Arc::new(listener), check_host)?;

    let format = args.format;
    let printer = tokio::spawn(async move {
        let mut position = 0;
        while let Some(event) = events.recv().await {
            match event {
                SearchEvent::OldResultCleared { .. } => position = 0,
                SearchEvent::ItemFound { .. } => position += 1,
                _ => {}
            }
            print_event(&event, position, format);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();
    while let Some(line) = lines.next_line().await? {
        pending.push(search.submit(&line));
    }

    for outcome in join_all(pending).await {
        outcome?;
    }
    drop(search);
    printer.await?;
    Ok(())
}

fn print_item(position: usize, item: &SearchItem) {
    println!("{}. {}", position, item.title);
    println!("   URL: {}", item.link);
    if !item.description.is_empty() {
        let description: String = item.description.chars().take(150).collect();
        if description.len() < item.description.len() {
            println!("   {}...", description);
        } else {
            println!("   {}", description);
        }
    }
    if let Some(size) = &item.size_name {
        println!("   Size: {}", size);
    }
    println!();
}

fn print_event(event: &SearchEvent, position: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Failed to encode event: {}", e),
        },
        OutputFormat::Compact => {
            if let SearchEvent::ItemFound { item } = event {
                println!("{}\t{}", item.title, item.link);
            }
        }
        OutputFormat::Text => match event {
            SearchEvent::LoadingData => eprintln!("Loading..."),
            SearchEvent::OldResultCleared { count } => {
                eprintln!("Cleared {} previous results", count)
            }
            SearchEvent::NetworkUnavailable => eprintln!("Network unavailable"),
            SearchEvent::FinishedData => eprintln!("Done"),
            SearchEvent::Error { message, .. } => eprintln!("Error: {}", message),
            SearchEvent::ItemFound { item } => print_item(position, item),
        },
    }
}
