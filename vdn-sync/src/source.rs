//! Client side of the remote log API.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;
use vdn_messages::thor::BestBlock;
use vdn_messages::thor::LogQuery;
use vdn_messages::thor::RawLog;
use vdn_messages::BlockNr;

use crate::error::SyncError;
use crate::error::SyncResult;

const HTTP_TIMEOUT: u64 = 60;

/// The remote service the replay engine pages logs from.
#[async_trait]
pub trait LogSource {
    /// Height of the latest block known to the node.
    async fn current_height(&self) -> SyncResult<BlockNr>;

    /// One page of logs matching `query`.
    async fn query_logs(
        &self,
        query: &LogQuery,
    ) -> SyncResult<Vec<RawLog>>;
}

/// [`LogSource`] backed by the REST API of a Thor node.
#[derive(Clone, Debug)]
pub struct ThorClient {
    client: reqwest::Client,
    best_block_url: Url,
    logs_url: Url,
}

impl ThorClient {
    pub fn new(node_url: &str) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT))
            .build()?;
        Self::with_client(client, node_url)
    }

    /// Talk to `node_url` through a preconfigured HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        node_url: &str,
    ) -> SyncResult<Self> {
        let base = node_url.trim_end_matches('/');
        let parse = |path: &str| {
            let url = format!("{base}/{path}");
            Url::parse(&url).map_err(|err| {
                SyncError::InvalidUrl {
                    url,
                    reason: err.to_string(),
                }
            })
        };
        let best_block_url = parse("blocks/best")?;
        let logs_url = parse("logs/event")?;

        Ok(Self {
            client,
            best_block_url,
            logs_url,
        })
    }

    fn check_status(response: reqwest::Response) -> SyncResult<reqwest::Response> {
        if !response.status().is_success() {
            return Err(SyncError::Status {
                url: response.url().to_string(),
                status: response.status(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl LogSource for ThorClient {
    async fn current_height(&self) -> SyncResult<BlockNr> {
        let response = self
            .client
            .get(self.best_block_url.clone())
            .send()
            .await?;
        let best: BestBlock = Self::check_status(response)?.json().await?;
        debug!("Best block. number: {}", best.number);
        Ok(best.number)
    }

    async fn query_logs(
        &self,
        query: &LogQuery,
    ) -> SyncResult<Vec<RawLog>> {
        let response = self
            .client
            .post(self.logs_url.clone())
            .json(query)
            .send()
            .await?;
        let logs = Self::check_status(response)?.json().await?;
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use vdn_messages::thor::BlockRange;
    use vdn_messages::thor::Criteria;
    use vdn_messages::thor::Order;
    use vdn_messages::thor::QueryOptions;

    use super::*;

    /// Answer the first request on a local socket with `status` and `body`,
    /// returning the base URL to point a client at.
    async fn serve_once(
        status: &str,
        body: &str,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    /// Consume the request head and body so closing the socket does not
    /// reset the connection under the client.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&request).to_lowercase();
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let body_len = text[..head_end]
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= head_end + 4 + body_len {
                return;
            }
        }
    }

    fn local_client(url: &str) -> ThorClient {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ThorClient::with_client(client, url).unwrap()
    }

    fn page_query() -> LogQuery {
        LogQuery {
            range: BlockRange::blocks(0, 10),
            options: QueryOptions {
                offset: 0,
                limit: 256,
            },
            criteria_set: vec![Criteria::topic0(B256::ZERO)],
            order: Order::Asc,
        }
    }

    #[test]
    fn test_endpoints_from_node_url() {
        let client = ThorClient::new("https://node-mainnet.vechain.energy/").unwrap();
        assert_eq!(
            client.best_block_url.as_str(),
            "https://node-mainnet.vechain.energy/blocks/best"
        );
        assert_eq!(
            client.logs_url.as_str(),
            "https://node-mainnet.vechain.energy/logs/event"
        );
    }

    #[test]
    fn test_rejects_malformed_node_url() {
        let err = ThorClient::new("not a url").unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_current_height_reads_best_block() {
        let url = serve_once("200 OK", r#"{"number":1234,"id":null,"isTrunk":true}"#).await;
        let client = local_client(&url);

        assert_eq!(client.current_height().await.unwrap(), 1234);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let url = serve_once("503 Service Unavailable", "").await;
        let client = local_client(&url);

        let err = client.current_height().await.unwrap_err();
        match err {
            SyncError::Status { url, status } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert!(url.ends_with("/blocks/best"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_logs_rejects_bad_request() {
        let url = serve_once("400 Bad Request", r#""invalid criteria""#).await;
        let client = local_client(&url);

        let err = client.query_logs(&page_query()).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Status { status, .. } if status == reqwest::StatusCode::BAD_REQUEST
        ));
    }

    #[tokio::test]
    async fn test_query_logs_parses_empty_page() {
        let url = serve_once("200 OK", "[]").await;
        let client = local_client(&url);

        assert!(client.query_logs(&page_query()).await.unwrap().is_empty());
    }
}
