use crate::constants::REACHABILITY_TIMEOUT;
use crate::errors::RiderError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

/// Answers "can we talk to the API right now?" before a request is issued.
#[async_trait]
pub trait Reachability: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Opens (and drops) a TCP connection to the API host.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn for_url(url: &Url) -> Result<Self, RiderError> {
        let host = url
            .host_str()
            .ok_or_else(|| RiderError::Validation(format!("API url {} has no host", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| RiderError::Validation(format!("API url {} has no port", url)))?;
        Ok(Self::new(host, port, REACHABILITY_TIMEOUT))
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl Reachability for TcpProbe {
    async fn is_reachable(&self) -> bool {
        matches!(
            timeout(self.timeout, TcpStream::connect((self.host.as_str(), self.port))).await,
            Ok(Ok(_))
        )
    }
}
