//! Pinning JSON documents to IPFS through a third party pinning service.

pub mod config;
pub mod http_client;
mod nft_storage;

pub use {config::IpfsConfig, nft_storage::NftStorage};
use {
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display, Formatter},
};

/// Content identifier as returned by the pinning service.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl Display for ContentId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(cid: &str) -> Self {
        Self(cid.to_owned())
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PinStatus {
    Queued,
    Pinning,
    Pinned,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the pinning service requires an API key")]
    MissingApiKey,

    #[error("'{0}' cannot be used as base URL")]
    InvalidBaseUrl(url::Url),

    // Connectivity or non-response error
    #[error("failed to send request")]
    Send(#[source] reqwest::Error),

    #[error("failed to read response body")]
    Body(#[source] reqwest::Error),

    #[error("pinning service responded with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Error({0}) for response {1}")]
    Deserialize(#[source] serde_json::Error, String),

    #[error("'{0}' is not a valid pin status")]
    InvalidPinStatus(String),
}

/// A service that stores documents on IPFS and keeps them pinned.
///
/// Failures are returned as they happen; nothing is retried.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait IpfsPinning: Send + Sync {
    /// Uploads `document` and returns its content identifier. Uploading the
    /// same bytes again returns the same identifier.
    async fn store_json(&self, document: &[u8]) -> Result<ContentId, Error>;

    /// Pinning status of previously stored content.
    async fn fetch_pin_status(&self, cid: &ContentId) -> Result<PinStatus, Error>;
}
