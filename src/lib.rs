//! # yacy-search
//!
//! A latest-wins streaming search client for YaCy peers.
//!
//! Queries are sent as a single HTTP GET to a configurable host. The RSS
//! response is parsed while it downloads, and every item is handed to a
//! [`SearchListener`] as soon as it is decoded. Submitting a new query
//! supersedes every earlier one: superseded searches stop at their next
//! checkpoint and never deliver results or terminal callbacks.
//!
//! - Whitespace-collapsing, URL-safe query normalization
//! - Wrap-around request ids with per-search cancellation tokens
//! - Incremental XML decoding over the HTTP byte stream
//! - Connectivity check before every request
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use yacy_search::{RecordingListener, Search, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = Arc::new(RecordingListener::new());
//!     let search = Search::new(SearchConfig::new("localhost:8090"), listener)?;
//!
//!     search.run("rust programming").await;
//!
//!     for item in search.results() {
//!         println!("{}: {}", item.title, item.link);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod fetcher;
mod listener;
mod query;
mod result;
mod search;
mod sequencer;
mod session;

pub mod connectivity;
pub mod parser;

pub use config::{SearchConfig, DEFAULT_HOST};
pub use connectivity::{AlwaysOnline, Connectivity, StaticConnectivity, TcpProbe};
pub use error::{Result, SearchError};
pub use fetcher::HttpFetcher;
pub use listener::{ChannelListener, NoopListener, RecordingListener, SearchEvent, SearchListener};
pub use parser::{ResultParser, XmlResultParser};
pub use query::{normalize, SearchQuery};
pub use result::{ResultStore, SearchItem};
pub use search::{Search, SearchOutcome, SearchState};
pub use sequencer::{Generation, RequestId, RequestSequencer};
pub use session::SearchSession;
