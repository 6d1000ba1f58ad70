//! Search orchestration.
//!
//! Every submission takes a fresh [`Generation`] before anything else
//! happens. From then on the invocation checks that it is still the latest
//! one before connecting, after the response headers arrive and before each
//! item is stored. A superseded invocation stops at the next checkpoint and
//! ends silently; only the latest search ever reaches a terminal callback.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::connectivity::{AlwaysOnline, Connectivity};
use crate::fetcher::HttpFetcher;
use crate::listener::SearchListener;
use crate::parser::{ResultParser, XmlResultParser};
use crate::session::SearchSession;
use crate::sequencer::Generation;
use crate::{Result, SearchConfig, SearchError, SearchItem, SearchQuery};

/// Lifecycle states of one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    CheckingConnectivity,
    Connecting,
    AwaitingHeaders,
    StreamingBody,
    Done,
    Cancelled,
    Failed,
}

impl SearchState {
    /// Returns true for states no invocation leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::CheckingConnectivity => "checking-connectivity",
            Self::Connecting => "connecting",
            Self::AwaitingHeaders => "awaiting-headers",
            Self::StreamingBody => "streaming-body",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a search invocation ended.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The query was empty; nothing was submitted.
    Skipped,
    /// All items were delivered.
    Finished { items: usize },
    /// No network was available.
    NetworkUnavailable,
    /// A newer search superseded this one.
    Cancelled,
    /// The search failed; the listener already received the error.
    Failed(SearchError),
}

impl SearchOutcome {
    /// The state the invocation ended in.
    pub fn state(&self) -> SearchState {
        match self {
            Self::Skipped => SearchState::Idle,
            Self::Finished { .. } => SearchState::Done,
            Self::Cancelled => SearchState::Cancelled,
            Self::NetworkUnavailable | Self::Failed(_) => SearchState::Failed,
        }
    }

    /// Returns true if a newer search superseded this one.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

enum Progress {
    Finished(usize),
    Superseded,
}

/// Latest-wins search client for a single host.
///
/// Cloning is cheap; clones share the session, listener and HTTP client.
#[derive(Clone)]
pub struct Search {
    config: Arc<SearchConfig>,
    session: Arc<SearchSession>,
    listener: Arc<dyn SearchListener>,
    connectivity: Arc<dyn Connectivity>,
    parser: Arc<dyn ResultParser>,
    fetcher: HttpFetcher,
}

impl Search {
    /// Creates a search client for `config`, reporting to `listener`.
    pub fn new(config: SearchConfig, listener: Arc<dyn SearchListener>) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            session: Arc::new(SearchSession::new()),
            listener,
            connectivity: Arc::new(AlwaysOnline),
            parser: Arc::new(XmlResultParser::new()),
            fetcher,
        })
    }

    /// Replaces the connectivity check.
    pub fn with_connectivity<C: Connectivity + 'static>(mut self, connectivity: C) -> Self {
        self.connectivity = Arc::new(connectivity);
        self
    }

    /// Replaces the response parser.
    pub fn with_parser<P: ResultParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Replaces the HTTP fetcher.
    pub fn with_fetcher(mut self, fetcher: HttpFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The shared session state.
    pub fn session(&self) -> &Arc<SearchSession> {
        &self.session
    }

    /// Whether a search is currently loading.
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// The last raw query submitted.
    pub fn last_search(&self) -> Option<String> {
        self.session.last_search()
    }

    /// Snapshot of the current results.
    pub fn results(&self) -> Vec<SearchItem> {
        self.session.items()
    }

    /// Clears the current results, notifying the listener.
    pub fn clear_results(&self) -> usize {
        self.session.results().clear(self.listener.as_ref())
    }

    /// Submits `raw` and runs it in the background.
    ///
    /// The request id is taken before this returns, so submission order is
    /// supersession order. Must be called from within a tokio runtime.
    pub fn submit(&self, raw: &str) -> JoinHandle<SearchOutcome> {
        let started = self.begin(raw);
        let this = self.clone();
        tokio::spawn(async move {
            match started {
                Some((query, generation)) => this.complete(query, generation).await,
                None => SearchOutcome::Skipped,
            }
        })
    }

    /// Submits `raw` and drives it to completion on the current task.
    pub async fn run(&self, raw: &str) -> SearchOutcome {
        match self.begin(raw) {
            Some((query, generation)) => self.complete(query, generation).await,
            None => SearchOutcome::Skipped,
        }
    }

    fn begin(&self, raw: &str) -> Option<(SearchQuery, Generation)> {
        self.session.record_search(raw);
        let query = SearchQuery::new(raw);
        if query.is_empty() {
            debug!("Empty query, nothing to search");
            return None;
        }

        let generation = self.session.start();
        self.listener.on_loading_data();
        debug!("Request {} submitted for '{}'", generation.id(), query.terms);
        Some((query, generation))
    }

    async fn complete(&self, query: SearchQuery, generation: Generation) -> SearchOutcome {
        let result = self.execute(&query, &generation).await;
        let outcome = match result {
            Ok(Progress::Superseded) => SearchOutcome::Cancelled,
            // Lowering the flag doubles as the final staleness check.
            _ if !self.session.finish(&generation) => SearchOutcome::Cancelled,
            Ok(Progress::Finished(items)) => {
                self.listener.on_finished_data();
                SearchOutcome::Finished { items }
            }
            Err(SearchError::NetworkUnavailable) => {
                self.listener.on_network_unavailable();
                SearchOutcome::NetworkUnavailable
            }
            Err(e) => {
                warn!("Request {} failed: {}", generation.id(), e);
                self.listener.on_error(&e);
                SearchOutcome::Failed(e)
            }
        };
        debug!("Request {} ended {}", generation.id(), outcome.state());
        outcome
    }

    async fn execute(&self, query: &SearchQuery, generation: &Generation) -> Result<Progress> {
        enter(generation, SearchState::CheckingConnectivity);
        if !self.connectivity.is_available(&self.config.host).await {
            return Err(SearchError::NetworkUnavailable);
        }

        enter(generation, SearchState::Connecting);
        let url = self
            .config
            .search_url(self.parser.search_path(), &query.terms)?;
        if generation.is_superseded() {
            return Ok(superseded(generation, SearchState::Connecting));
        }

        enter(generation, SearchState::AwaitingHeaders);
        let response = self.fetcher.open(url).await?;
        if generation.is_superseded() {
            return Ok(superseded(generation, SearchState::AwaitingHeaders));
        }

        enter(generation, SearchState::StreamingBody);
        let store = self.session.results();
        if store
            .clear_if_current(self.listener.as_ref(), generation)
            .is_none()
        {
            return Ok(superseded(generation, SearchState::StreamingBody));
        }
        let mut body = HttpFetcher::body(response);
        let items = self
            .parser
            .parse(&mut body, store, self.listener.as_ref(), generation)
            .await?;
        if generation.is_superseded() {
            return Ok(superseded(generation, SearchState::StreamingBody));
        }
        Ok(Progress::Finished(items))
    }
}

fn enter(generation: &Generation, state: SearchState) {
    debug!("Request {} -> {}", generation.id(), state);
}

fn superseded(generation: &Generation, state: SearchState) -> Progress {
    debug!("Request {} superseded while {}", generation.id(), state);
    Progress::Superseded
}
