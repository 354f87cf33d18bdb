//! HTTP client for the session bridge

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, instrument};

use harvest_core::source::{MessageRange, SourceChannel, SourceMessage};
use harvest_core::traits::{MessageSource, SourceResult};
use harvest_core::DomainError;

use crate::error::{map_status, map_transport_error};

/// Connection settings for the bridge
#[derive(Debug, Clone)]
pub struct SourceClientConfig {
    /// Bridge base URL, e.g. `http://127.0.0.1:8081`
    pub base_url: String,
    /// Optional bearer token
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl From<&harvest_common::SourceConfig> for SourceClientConfig {
    fn from(config: &harvest_common::SourceConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            token: config.token.clone(),
            timeout: config.timeout(),
        }
    }
}

/// [`MessageSource`] that forwards every call to the session bridge
#[derive(Debug, Clone)]
pub struct HttpMessageSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpMessageSource {
    /// Build a client for the given bridge
    pub fn new(config: &SourceClientConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::InternalError(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn range_query(range: &MessageRange) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(3);
    if let Some(min_id) = range.min_id {
        query.push(("min_id", min_id.to_string()));
    }
    if let Some(max_id) = range.max_id {
        query.push(("max_id", max_id.to_string()));
    }
    if let Some(limit) = range.limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    #[instrument(skip(self))]
    async fn resolve_channel(&self, name: &str) -> SourceResult<SourceChannel> {
        let response = self
            .get("/channels/resolve")
            .query(&[("name", name)])
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            status if status.is_success() => {
                response.json::<SourceChannel>().await.map_err(map_transport_error)
            }
            StatusCode::NOT_FOUND => Err(DomainError::ChannelNotFound(name.to_string())),
            status => Err(map_status(status, "resolve channel")),
        }
    }

    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    async fn fetch_messages(
        &self,
        channel: &SourceChannel,
        range: MessageRange,
    ) -> SourceResult<Vec<SourceMessage>> {
        let response = self
            .get(&format!("/channels/{}/messages", channel.id))
            .query(&range_query(&range))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status, "fetch messages"));
        }

        let mut messages = response
            .json::<Vec<SourceMessage>>()
            .await
            .map_err(map_transport_error)?;
        messages.sort_by(|a, b| b.id.cmp(&a.id));

        debug!(count = messages.len(), "Fetched messages");
        Ok(messages)
    }

    #[instrument(skip(self, channel, message), fields(channel_id = %channel.id, message_id = %message.id))]
    async fn download_media(
        &self,
        channel: &SourceChannel,
        message: &SourceMessage,
    ) -> SourceResult<Vec<u8>> {
        let response = self
            .get(&format!(
                "/channels/{}/messages/{}/media",
                channel.id, message.id
            ))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::DownloadFailed(format!(
                "message {}: {status}",
                message.id
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::DownloadFailed(format!("message {}: {e}", message.id)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::value_objects::MessageId;

    #[test]
    fn test_range_query_skips_open_bounds() {
        let query = range_query(&MessageRange::after(MessageId::new(10), 15));
        assert_eq!(
            query,
            vec![("min_id", "10".to_string()), ("limit", "15".to_string())]
        );

        let query = range_query(&MessageRange::between(MessageId::new(3), MessageId::new(8)));
        assert_eq!(
            query,
            vec![("min_id", "3".to_string()), ("max_id", "9".to_string())]
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let source = HttpMessageSource::new(&SourceClientConfig {
            base_url: "http://bridge:8081/".to_string(),
            token: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(source.base_url, "http://bridge:8081");
    }
}
