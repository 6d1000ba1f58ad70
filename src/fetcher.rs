//! HTTP transport for search requests.

use futures::TryStreamExt;
use reqwest::{Client, Response, StatusCode};
use tokio::io::AsyncBufRead;
use tokio_util::io::StreamReader;
use tracing::debug;
use url::Url;

use crate::config::SearchConfig;
use crate::{Result, SearchError};

/// Issues search requests and exposes response bodies as byte streams.
///
/// Header reception and body consumption are separate steps so the caller
/// can check for staleness in between.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher honouring the timeouts and User-Agent of `config`.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .build()?;
        Ok(Self { client })
    }

    /// Creates a fetcher with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Sends a GET to `url` and waits for the response headers.
    ///
    /// Any status other than 200 OK fails with [`SearchError::HttpStatus`];
    /// the response is dropped, releasing the connection.
    pub async fn open(&self, url: Url) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SearchError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    /// Turns a response into a buffered reader over its body.
    ///
    /// Bytes are pulled from the network only as the reader is polled.
    pub fn body(response: Response) -> impl AsyncBufRead + Send + Unpin {
        StreamReader::new(Box::pin(response.bytes_stream().map_err(std::io::Error::other)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_http_fetcher_new() {
        assert!(HttpFetcher::new(&SearchConfig::default()).is_ok());
    }

    #[test]
    fn test_http_fetcher_with_client() {
        let client = Client::builder().user_agent("test-agent").build().unwrap();
        let _fetcher = HttpFetcher::with_client(client);
    }

    #[tokio::test]
    async fn test_open_and_read_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/yacysearch.rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&SearchConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/yacysearch.rss?query=x", server.uri())).unwrap();
        let response = fetcher.open(url).await.unwrap();

        let mut body = String::new();
        HttpFetcher::body(response)
            .read_to_string(&mut body)
            .await
            .unwrap();
        assert_eq!(body, "<rss/>");
    }

    #[tokio::test]
    async fn test_open_rejects_non_ok_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&SearchConfig::default()).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher.open(url).await.unwrap_err();
        assert!(matches!(err, SearchError::HttpStatus(204)));
    }

    #[tokio::test]
    async fn test_open_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(&SearchConfig::default()).unwrap();
        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let err = fetcher.open(url).await.unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
    }
}
