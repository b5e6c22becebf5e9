//! HTTP GET transport used by the Jikan client.
//!
//! The client only needs "GET this URL with these query parameters"; keeping
//! that behind a trait lets tests script responses without a network.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Raw response handed back to the client
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Failures below the HTTP status level. Both kinds are retried by the client.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Single GET capability
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with a per-request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new("isekai-dataset-test", Duration::from_secs(5));
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_slow_server_maps_to_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection and never answer
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let transport = HttpTransport::new("isekai-dataset-test", Duration::from_millis(100)).unwrap();
        let result = transport.get(&format!("http://{}/anime", addr), &[]).await;

        assert!(matches!(result, Err(TransportError::Timeout(_))), "got {:?}", result);
        server.abort();
    }

    #[tokio::test]
    async fn test_refused_connection_maps_to_network() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new("isekai-dataset-test", Duration::from_secs(5)).unwrap();
        let result = transport.get(&format!("http://{}/anime", addr), &[]).await;

        assert!(matches!(result, Err(TransportError::Network(_))), "got {:?}", result);
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Timeout("after 30s".to_string());
        assert_eq!(err.to_string(), "request timed out: after 30s");
    }
}
