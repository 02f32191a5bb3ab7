use oms_shared::Order;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The server does not know the order. Holds the server's message.
    #[error("{0}")]
    NotFound(String),
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },
    /// The request never produced a usable response
    #[error("{0}")]
    Transport(String),
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest keeps the useful part ("connection refused") in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        LookupError::Transport(message)
    }
}

#[derive(Clone)]
pub struct LookupClient {
    client: Client,
    base_url: Url,
}

impl LookupClient {
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        let base_url = Url::parse(base_url).map_err(|e| LookupError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// `{base_url}/order/{uid}`, with `uid` percent-encoded as one path segment
    pub fn order_url(&self, uid: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("order")
            .push(uid);
        Ok(url)
    }

    /// Issues exactly one `GET /order/{uid}`.
    pub async fn fetch_order(&self, uid: &str) -> Result<Order, LookupError> {
        let url = self.order_url(uid)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            let text = response.text().await?;
            let message = if text.is_empty() {
                format!("Order {} not found", uid)
            } else {
                text
            };
            Err(LookupError::NotFound(message))
        } else if status.is_success() {
            let order: Order = response.json().await?;
            Ok(order)
        } else {
            Err(LookupError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            })
        }
    }
}
