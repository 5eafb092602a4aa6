use std::{future::Future, time::Duration};

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::Result;

/// Query parameters of an API call, in the order they are sent.
pub type Params = Vec<(String, String)>;

pub const DEFAULT_API_URL: &str = "https://api.icq.net/bot/v1/";

/// Timeout for every call that isn't a long poll.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Extra time given to long polls on top of their `pollTime`.
const POLL_MARGIN: Duration = Duration::from_secs(10);

/// Something that can perform a call to a named API method and hand back
/// the decoded JSON response.
///
/// The token is already part of `params` by the time it gets here.
pub trait Transport: Send + Sync + 'static {
    fn call(
        &self,
        method: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// The real thing: `GET {api_url}{method}?{params}` over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_url: Url,
}

impl HttpTransport {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, same as [`Client::new`].
    /// [`DEFAULT_API_URL`] is a constant and always parses.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_url: Url::parse(DEFAULT_API_URL).expect("Default API URL is always valid"),
        }
    }

    /// Use a different API server. The URL should end with a `/`, otherwise
    /// its last path segment gets replaced by the method name.
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// How long to wait for a response to a call with these parameters.
fn timeout_for(params: &[(String, String)]) -> Duration {
    params
        .iter()
        .find(|(key, _)| key == "pollTime")
        .and_then(|(_, value)| value.parse::<u64>().ok())
        .map_or(REQUEST_TIMEOUT, |secs| Duration::from_secs(secs) + POLL_MARGIN)
}

impl Transport for HttpTransport {
    async fn call(&self, method: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.api_url.join(method)?;
        log::trace!("Calling {url}");

        let value = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout_for(params))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn long_polls_get_extra_time() {
        assert_eq!(timeout_for(&params(&[("token", "t")])), REQUEST_TIMEOUT);
        assert_eq!(
            timeout_for(&params(&[("lastEventId", "3"), ("pollTime", "20")])),
            Duration::from_secs(30)
        );
        assert_eq!(timeout_for(&params(&[("pollTime", "soon")])), REQUEST_TIMEOUT);
    }

    #[test]
    fn method_is_joined_under_api_url() {
        let transport = HttpTransport::new();
        assert_eq!(
            transport.api_url().join("events/get").unwrap().as_str(),
            "https://api.icq.net/bot/v1/events/get"
        );

        let transport =
            transport.with_api_url(Url::parse("http://127.0.0.1:8080/myteam/bot/v1/").unwrap());
        assert_eq!(
            transport
                .api_url()
                .join("messages/sendText")
                .unwrap()
                .as_str(),
            "http://127.0.0.1:8080/myteam/bot/v1/messages/sendText"
        );
    }
}
