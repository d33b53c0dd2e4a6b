//! The HTTP client for the external assistant API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// What the user sees when the assistant cannot be reached.
pub const CHAT_FALLBACK_REPLY: &str =
    "The assistant is still warming up. Please try again in a moment.";

/// How long to wait for any single assistant request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// How many times the warm-up probe retries before giving up.
const HEALTH_ATTEMPTS: u32 = 3;

/// How long to wait between warm-up probes.
const HEALTH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// The financial context sent along with every chat message so the
/// assistant can ground its replies in the user's numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChatContext {
    /// The user's confirmed monthly income, when a budget exists.
    pub monthly_income: Option<i64>,
    /// The monthly variable budget, when one is set.
    pub monthly_budget: Option<i64>,
    /// What the user has spent today.
    pub today_spent: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    context: &'a ChatContext,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TtsReply {
    audio: String,
}

/// A client for the external assistant API.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    base_url: String,
}

impl AssistantClient {
    /// Create a client for the assistant service at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send a chat message with the user's financial context.
    ///
    /// Never fails from the caller's point of view: a network or decode
    /// error is logged and replaced with [CHAT_FALLBACK_REPLY].
    pub async fn chat(&self, message: &str, context: &ChatContext) -> String {
        match self.try_chat(message, context).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!("assistant chat request failed: {error}");
                CHAT_FALLBACK_REPLY.to_owned()
            }
        }
    }

    async fn try_chat(
        &self,
        message: &str,
        context: &ChatContext,
    ) -> Result<String, reqwest::Error> {
        let reply: ChatReply = self
            .http
            .post(self.url("chat"))
            .timeout(REQUEST_TIMEOUT)
            .json(&ChatRequest { message, context })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(reply.reply)
    }

    /// Synthesize speech for a reply, returning base64-encoded audio.
    ///
    /// # Errors
    /// Returns [Error::AssistantUnavailable] when the service cannot be
    /// reached or answers with an error; there is no audio to fall back
    /// to.
    pub async fn tts(&self, text: &str) -> Result<String, Error> {
        let reply: TtsReply = self
            .http
            .post(self.url("tts"))
            .timeout(REQUEST_TIMEOUT)
            .json(&TtsRequest { text })
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| {
                tracing::warn!("assistant tts request failed: {error}");
                Error::AssistantUnavailable
            })?
            .json()
            .await
            .map_err(|error| {
                tracing::warn!("assistant tts reply was malformed: {error}");
                Error::AssistantUnavailable
            })?;

        Ok(reply.audio)
    }

    /// Probe whether the assistant is warmed up, retrying a few times.
    ///
    /// The first request after a cold start routinely fails while the
    /// service spins up, so one failed probe is not an answer.
    pub async fn warm_up(&self) -> bool {
        for attempt in 1..=HEALTH_ATTEMPTS {
            match self.try_health().await {
                Ok(()) => return true,
                Err(error) => {
                    tracing::debug!("health probe attempt {attempt} failed: {error}");
                    if attempt < HEALTH_ATTEMPTS {
                        tokio::time::sleep(HEALTH_RETRY_DELAY).await;
                    }
                }
            }
        }

        false
    }

    async fn try_health(&self) -> Result<(), reqwest::Error> {
        self.http
            .get(self.url("health"))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client() -> AssistantClient {
        // Port 9 (discard) refuses connections immediately.
        AssistantClient::new("http://127.0.0.1:9/")
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = unreachable_client();

        assert_eq!(client.url("chat"), "http://127.0.0.1:9/chat");
    }

    #[tokio::test]
    async fn chat_falls_back_when_unreachable() {
        let client = unreachable_client();

        let reply = client.chat("hello", &ChatContext::default()).await;

        assert_eq!(reply, CHAT_FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn tts_errors_when_unreachable() {
        let client = unreachable_client();

        let result = client.tts("hello").await;

        assert_eq!(result, Err(Error::AssistantUnavailable));
    }
}
