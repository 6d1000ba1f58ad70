//! Network reachability checks run before every search.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Answers whether the network is usable for reaching a host.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Returns true if `host` (`name[:port]`) can be reached.
    async fn is_available(&self, host: &str) -> bool;
}

/// Assumes the network is always up.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl Connectivity for AlwaysOnline {
    async fn is_available(&self, _host: &str) -> bool {
        true
    }
}

/// Reports a fixed answer, for embedders that track connectivity themselves.
#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub bool);

#[async_trait]
impl Connectivity for StaticConnectivity {
    async fn is_available(&self, _host: &str) -> bool {
        self.0
    }
}

/// Probes reachability by opening a TCP connection to the host.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    /// Creates a probe that gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

#[async_trait]
impl Connectivity for TcpProbe {
    async fn is_available(&self, host: &str) -> bool {
        let Ok(url) = Url::parse(&format!("http://{host}/")) else {
            return false;
        };
        let (Some(name), Some(port)) = (url.host_str(), url.port_or_known_default()) else {
            return false;
        };
        let name = name.trim_start_matches('[').trim_end_matches(']');

        match timeout(self.timeout, TcpStream::connect((name, port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Probe to {}:{} failed: {}", name, port, e);
                false
            }
            Err(_) => {
                debug!("Probe to {}:{} timed out", name, port);
                false
            }
        }
    }
}
