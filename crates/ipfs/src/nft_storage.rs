use {
    crate::{ContentId, Error, IpfsPinning, PinStatus},
    reqwest::{Client, RequestBuilder, header::CONTENT_TYPE},
    serde::{Deserialize, de::DeserializeOwned},
    url::Url,
};

/// Client of the [nft.storage](https://nft.storage) HTTP API.
pub struct NftStorage {
    client: Client,
    base_url: Url,
    api_key: String,
}

#[derive(Deserialize)]
struct RawResponse<T> {
    ok: bool,
    value: Option<T>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct Upload {
    cid: String,
}

#[derive(Deserialize)]
struct Check {
    pin: Pin,
}

#[derive(Deserialize)]
struct Pin {
    status: String,
}

impl NftStorage {
    /// Default nft.storage API URL.
    pub const DEFAULT_URL: &'static str = "https://api.nft.storage/";

    /// The API rejects anonymous requests, so a key is required.
    pub fn new(client: Client, base_url: Url, api_key: Option<String>) -> Result<Self, Error> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url));
        }
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked on construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Error::Send)?;
        let status = response.status();
        let body = response.text().await.map_err(Error::Body)?;
        tracing::debug!(%status, %body, "response from nft.storage");

        let api_error = |message: String| Error::Api {
            status: status.as_u16(),
            message,
        };
        match serde_json::from_str::<RawResponse<T>>(&body) {
            Ok(RawResponse {
                ok: true,
                value: Some(value),
                ..
            }) if status.is_success() => Ok(value),
            Ok(RawResponse {
                error: Some(ApiError { message }),
                ..
            }) => Err(api_error(message)),
            Ok(_) => Err(api_error("unexpected response".to_owned())),
            Err(_) if !status.is_success() => Err(api_error(body)),
            Err(err) => Err(Error::Deserialize(err, body)),
        }
    }
}

#[async_trait::async_trait]
impl IpfsPinning for NftStorage {
    async fn store_json(&self, document: &[u8]) -> Result<ContentId, Error> {
        let url = self.url(&["upload"]);
        tracing::debug!(%url, size = document.len(), "storing JSON document");
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(document.to_vec());
        let upload: Upload = self.request(request).await?;
        tracing::debug!(cid = %upload.cid, "stored JSON document");
        Ok(ContentId(upload.cid))
    }

    async fn fetch_pin_status(&self, cid: &ContentId) -> Result<PinStatus, Error> {
        let url = self.url(&["check", cid.0.as_str()]);
        tracing::debug!(%url, "fetching pin status");
        let check: Check = self.request(self.client.get(url)).await?;
        check
            .pin
            .status
            .parse()
            .map_err(|_| Error::InvalidPinStatus(check.pin.status))
    }
}
