//! Completion client adapter.
//!
//! [`CompletionClient`] is the seam between a turn and the remote model: it
//! takes a [`ChatRequest`] and yields a finite, non-restartable stream of
//! text fragments. [`ChatClient`] implements it over reqwest for any
//! OpenAI-compatible `chat/completions` endpoint.
//!
//! The API key is resolved on every call, before any network I/O. Failures
//! are surfaced to the caller as-is; nothing is retried here.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use futures::stream::{BoxStream, Stream, StreamExt};
use tracing::debug;

use crate::api::streaming::{Decoded, SseDecoder, StreamEvent};
use crate::credentials::CredentialResolver;
use crate::error::{ConfigError, RemoteError, TutorError};
use crate::{ChatRequest, DEFAULT_BASE_URL};

/// Text fragments of one reply, in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String, RemoteError>>;

/// Boxed future returned by [`CompletionClient::stream`], keeping the trait
/// dyn-compatible.
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FragmentStream, TutorError>> + Send + 'a>>;

/// Something that can stream a chat completion.
pub trait CompletionClient: Send + Sync {
    /// Start a completion. Resolves once the response headers are in (or
    /// with a configuration error before anything is sent); the returned
    /// stream then yields fragments until the model signals completion.
    fn stream(&self, request: ChatRequest) -> CompletionFuture<'_>;
}

/// Settings for [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Provider base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Where the API key comes from.
    pub credentials: CredentialResolver,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Maximum silence between two body chunks.
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: CredentialResolver::default(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(120),
        }
    }
}

/// Async HTTP client for an OpenAI-compatible chat completions API.
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    credentials: CredentialResolver,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let base = config.base_url.trim().trim_end_matches('/');
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(ConfigError::InvalidEndpoint(format!(
                "base URL must start with http:// or https://, got {:?}",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("omni-tutor/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidEndpoint(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{base}/chat/completions"),
            credentials: config.credentials,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn start(&self, request: ChatRequest) -> Result<FragmentStream, TutorError> {
        let api_key = self.credentials.resolve()?;

        debug!(
            "LLM request: model={}, messages={}, temp={}, max_tokens={:?}",
            request.model,
            request.messages.len(),
            request.temperature,
            request.max_tokens,
        );
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        let status = resp.status();
        debug!(
            "LLM response headers: HTTP {} in {:.1}s",
            status,
            start.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(fragment_stream(resp.bytes_stream()))
    }
}

impl CompletionClient for ChatClient {
    fn stream(&self, request: ChatRequest) -> CompletionFuture<'_> {
        Box::pin(self.start(request))
    }
}

struct FragmentState<S> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    fragments: usize,
    ended: bool,
    failure: Option<RemoteError>,
}

/// Turn a raw SSE body into text fragments.
///
/// Usage reports are logged, not forwarded. The stream ends after `Done`
/// or after the first error.
pub fn fragment_stream<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<RemoteError> + Send + 'static,
{
    let state = FragmentState {
        body: body.boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        fragments: 0,
        ended: false,
        failure: None,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(fragment) = st.pending.pop_front() {
                return Some((Ok(fragment), st));
            }
            if let Some(e) = st.failure.take() {
                return Some((Err(e), st));
            }
            if st.ended {
                return None;
            }

            let decoded = match st.body.next().await {
                Some(Ok(bytes)) => st.decoder.push(bytes.as_ref()),
                Some(Err(e)) => Decoded {
                    events: Vec::new(),
                    error: Some(e.into()),
                },
                None => st.decoder.finish(),
            };

            for event in decoded.events {
                match event {
                    StreamEvent::TextDelta(text) => {
                        st.fragments += 1;
                        st.pending.push_back(text);
                    }
                    StreamEvent::Usage(usage) => debug!(
                        "Token usage: prompt={}, completion={}, total={}",
                        usage.prompt_tokens.unwrap_or(0),
                        usage.completion_tokens.unwrap_or(0),
                        usage.total_tokens.unwrap_or(0),
                    ),
                    StreamEvent::Done => {
                        debug!("Stream completed with {} fragments", st.fragments);
                        st.ended = true;
                    }
                }
            }

            // Fragments decoded before the error go out first.
            if let Some(e) = decoded.error {
                st.ended = true;
                st.failure = Some(e);
            }
        }
    })
    .boxed()
}
