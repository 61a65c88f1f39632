//! HTTP transport: one request per operation against the node's endpoint.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use circlet_types::{Node, PutReceipt};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NetError;
use crate::{Transport, checked_path};

/// Port a storage node listens on when its host does not name one.
pub const DEFAULT_PORT: u16 = 1231;

/// URL scheme used to reach storage nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Https => f.write_str("https"),
        }
    }
}

/// Configuration for creating an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// URL scheme.
    pub scheme: Scheme,
    /// Port used for hosts that do not carry their own.
    pub port: u16,
    /// Whole-request timeout. `None` waits as long as the OS allows.
    pub timeout: Option<Duration>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            port: DEFAULT_PORT,
            timeout: None,
        }
    }
}

/// [`Transport`] speaking plain HTTP to storage nodes.
///
/// `fetch` is `GET {scheme}://{host}:{port}/{path}`; `put` is a `POST` of the
/// raw bytes to the same URL, answered with a JSON [`PutReceipt`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    scheme: Scheme,
    port: u16,
}

impl HttpTransport {
    /// Create a transport with its own connection pool.
    pub fn new(config: HttpTransportConfig) -> Result<Self, NetError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            scheme: config.scheme,
            port: config.port,
        })
    }

    /// Build the URL addressing `path` on `node`.
    ///
    /// Fails with [`NetError::InvalidPath`] for paths a store would reject:
    /// empty, or containing `.` or `..` segments.
    pub fn url(&self, node: &Node, path: &str) -> Result<Url, NetError> {
        let host = node.host();
        let invalid = |reason: String| NetError::InvalidUrl {
            host: host.to_string(),
            reason,
        };

        let path = checked_path(path)?;

        let mut url = Url::parse(&format!("{}://{}/", self.scheme, self.authority(host)))
            .map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("host cannot carry a path".to_string()))?
            .extend(path.split('/'));
        Ok(url)
    }

    /// `host:port`, keeping a port the host already names.
    fn authority(&self, host: &str) -> String {
        if let Some(rest) = host.strip_prefix('[') {
            // Bracketed IPv6, with or without a port.
            if rest.ends_with(']') {
                format!("{host}:{}", self.port)
            } else {
                host.to_string()
            }
        } else if host.matches(':').count() > 1 {
            format!("[{host}]:{}", self.port)
        } else if host.contains(':') {
            host.to_string()
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, node: &Node, path: &str) -> Result<Bytes, NetError> {
        let url = self.url(node, path)?;
        debug!(%node, %url, "fetching content");

        let response = self.client.get(url.clone()).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.bytes().await?),
            StatusCode::NOT_FOUND => Err(NetError::NotFound {
                node: node.name().to_string(),
                path: path.to_string(),
            }),
            status => Err(NetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn put(&self, node: &Node, path: &str, content: Bytes) -> Result<PutReceipt, NetError> {
        let url = self.url(node, path)?;
        debug!(%node, %url, size = content.len(), "putting content");

        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<PutReceipt>()
            .await
            .map_err(|e| NetError::Decode(e.to_string()))
    }
}
