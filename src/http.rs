use std::ops::Deref;
use std::time::Duration;

use anyhow::Context;

/// Thin wrapper over [`reqwest::Client`] with the crate-wide timeout baked
/// in. Deref gives access to the raw client for anything beyond typed GETs.
pub struct HttpClient(reqwest::Client);

impl Default for HttpClient {
    fn default() -> Self {
        Self(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap(),
        )
    }
}

impl Deref for HttpClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET `url` and parse the JSON body into `T`. A non-2xx status is an
    /// error even when the body parses.
    #[inline]
    pub async fn to_t<T>(&self, url: impl reqwest::IntoUrl + std::fmt::Display) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // for debugging usage
        let url_str = url.to_string();

        self.get(url)
            .send()
            .await
            .with_context(|| format!("fail to send GET request to url: `{}`", url_str))?
            .error_for_status()
            .with_context(|| format!("unexpected status from url: `{}`", url_str))?
            .json::<T>()
            .await
            .with_context(|| {
                format!(
                    "fail to parse response from url: `{}` to type `{}`",
                    url_str,
                    std::any::type_name::<T>()
                )
            })
    }
}
