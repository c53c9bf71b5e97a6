// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderValue;

use crate::Error;
use crate::Trap;
use crate::loggly::Message;
use crate::loggly::Transport;
use crate::loggly::worker::Worker;
use crate::loggly::worker::WorkerState;
use crate::trap::DefaultTrap;

const DEFAULT_HOST: &str = "https://logs-01.loggly.com";
const DEFAULT_BUFFER_SIZE: usize = 100;
const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TAG_HEADER: &str = "X-LOGGLY-TAG";

/// A buffered client for the Loggly bulk endpoint.
///
/// Messages are JSON-encoded on [`send`](Transport::send) and delivered in batches, one message
/// per line, when the buffer fills up, on every flush interval, on an explicit
/// [`flush`](Transport::flush), and when the client is dropped.
///
/// A full buffer wakes the background worker, so `send` does not wait for the delivery. Without a
/// worker (see [`ClientBuilder::flush_interval`]) the full buffer is flushed on the calling thread
/// and its result is returned from `send`.
///
/// The client performs blocking HTTP requests; do not build or drop it inside an async runtime.
#[derive(Debug)]
pub struct Client {
    inner: Arc<Inner>,
    state: Option<WorkerState>,
}

impl Client {
    /// Create a new [`ClientBuilder`] for `token`.
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    /// The URL messages are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// The tags attached to every delivery.
    pub fn tags(&self) -> Vec<String> {
        lock(&self.inner.tags).clone()
    }

    /// Number of messages waiting for the next flush.
    pub fn buffered(&self) -> usize {
        lock(&self.inner.buffer).len()
    }
}

impl Transport for Client {
    fn send(&self, message: Message) -> Result<(), Error> {
        let bytes = serde_json::to_vec(&message)
            .map_err(|err| Error::transport("failed to encode message").with_source(err))?;

        let full = {
            let mut buffer = lock(&self.inner.buffer);
            buffer.push(bytes);
            buffer.len() >= self.inner.buffer_size
        };

        if !full {
            return Ok(());
        }

        match &self.state {
            Some(state) => {
                state.wake();
                Ok(())
            }
            None => self.inner.flush(),
        }
    }

    fn flush(&self) -> Result<(), Error> {
        self.inner.flush()
    }

    fn tag(&self, tags: &str) {
        for tag in split_tags(tags) {
            match check_tag(&tag) {
                Ok(()) => lock(&self.inner.tags).push(tag),
                Err(err) => self.inner.trap.trap(&err),
            }
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        match self.state.take() {
            // the worker flushes the remaining messages before it exits
            Some(state) => state.shutdown(),
            None => {
                if let Err(err) = self.inner.flush() {
                    let err = Error::new(err.kind(), "failed to flush messages on drop")
                        .with_source(err);
                    self.inner.trap.trap(&err);
                }
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct Inner {
    http: reqwest::blocking::Client,
    endpoint: Url,
    buffer_size: usize,
    buffer: Mutex<Vec<Vec<u8>>>,
    tags: Mutex<Vec<String>>,
    pub(crate) trap: Box<dyn Trap>,
}

impl Inner {
    /// Post every buffered message. Messages are dropped once taken from the buffer, whether or
    /// not the delivery succeeds.
    pub(crate) fn flush(&self) -> Result<(), Error> {
        let messages = std::mem::take(&mut *lock(&self.buffer));
        if messages.is_empty() {
            return Ok(());
        }

        let count = messages.len();
        let body = messages.join(&b'\n');

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(body);

        let tags = lock(&self.tags).join(",");
        if !tags.is_empty() {
            request = request.header(TAG_HEADER, tags);
        }

        let response = request.send().map_err(|err| {
            Error::transport("failed to send messages")
                .with_context("count", count)
                .with_source(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport("non-2xx response")
                .with_context("status", status.as_u16())
                .with_context("count", count));
        }

        Ok(())
    }
}

/// A builder for configuring a Loggly [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    token: String,
    tags: Vec<String>,
    endpoint: Option<String>,
    buffer_size: usize,
    flush_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    trap: Box<dyn Trap>,
}

impl ClientBuilder {
    /// Create a new client builder for the customer `token`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use logforth_loggly::loggly::ClientBuilder;
    ///
    /// let builder = ClientBuilder::new("my-customer-token")
    ///     .tags(["web", "production"])
    ///     .flush_interval(Some(Duration::from_secs(1)));
    /// ```
    pub fn new(token: impl Into<String>) -> Self {
        ClientBuilder {
            token: token.into(),
            tags: vec![],
            endpoint: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval: Some(DEFAULT_FLUSH_INTERVAL),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Add comma-separated tags.
    ///
    /// Tags must be valid HTTP header values; [`build`](Self::build) rejects any that are not.
    pub fn tag(mut self, tags: &str) -> Self {
        self.tags.extend(split_tags(tags));
        self
    }

    /// Add multiple tags.
    pub fn tags<T: Into<String>>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        for tag in tags {
            self.tags.extend(split_tags(&tag.into()));
        }
        self
    }

    /// Override the URL messages are posted to.
    ///
    /// Default to `https://logs-01.loggly.com/bulk/<token>/`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the number of buffered messages that triggers a flush on send.
    ///
    /// Default to 100.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the interval of background flushes. `None` disables the background thread.
    ///
    /// Default to 5 seconds.
    pub fn flush_interval(mut self, interval: Option<Duration>) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the timeout of each delivery request. `None` waits indefinitely.
    ///
    /// This also bounds the flush a [`LogglyHook`](crate::loggly::LogglyHook) performs for
    /// `fatal` and `panic` records. Default to 30 seconds.
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the trap for errors of background and drop-time flushes.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Build the [`Client`].
    ///
    /// # Errors
    ///
    /// Return an error if the token is empty, a tag is not a valid header value, the endpoint is
    /// not a valid URL, the buffer size is zero, or the HTTP client or the background thread
    /// cannot be created.
    pub fn build(self) -> Result<Client, Error> {
        let ClientBuilder {
            token,
            tags,
            endpoint,
            buffer_size,
            flush_interval,
            request_timeout,
            trap,
        } = self;

        if token.trim().is_empty() {
            return Err(Error::invalid_config("token must not be empty"));
        }
        if buffer_size == 0 {
            return Err(Error::invalid_config("buffer size must be positive"));
        }
        for tag in &tags {
            check_tag(tag)?;
        }

        let endpoint = endpoint.unwrap_or_else(|| format!("{DEFAULT_HOST}/bulk/{token}/"));
        let endpoint = Url::parse(&endpoint).map_err(|err| {
            Error::invalid_config("malformed endpoint")
                .with_context("endpoint", &endpoint)
                .with_source(err)
        })?;

        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|err| Error::invalid_config("failed to build http client").with_source(err))?;

        let inner = Arc::new(Inner {
            http,
            endpoint,
            buffer_size,
            buffer: Mutex::new(Vec::with_capacity(buffer_size)),
            tags: Mutex::new(tags),
            trap,
        });

        let state = match flush_interval {
            Some(interval) => Some(Worker::new(inner.clone(), interval).spawn()?),
            None => None,
        };

        Ok(Client { inner, state })
    }
}

fn split_tags(tags: &str) -> impl Iterator<Item = String> + '_ {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
}

fn check_tag(tag: &str) -> Result<(), Error> {
    HeaderValue::from_str(tag).map_err(|err| {
        Error::invalid_config("tag is not a valid header value")
            .with_context("tag", format!("{tag:?}"))
            .with_source(err)
    })?;
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn builder() -> ClientBuilder {
        ClientBuilder::new("token-123").flush_interval(None)
    }

    #[test]
    fn default_endpoint_embeds_token() {
        let client = builder().build().unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://logs-01.loggly.com/bulk/token-123/"
        );
    }

    #[test]
    fn tags_are_split_and_trimmed() {
        let client = builder().tag("web, prod").tags(["a,,b"]).build().unwrap();
        client.tag(" late ,");
        assert_eq!(client.tags(), vec!["web", "prod", "a", "b", "late"]);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let err = ClientBuilder::new(" ").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = builder().endpoint("not a url").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = builder().buffer_size(0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = builder().tag("web,bad\ntag").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("bad\\ntag"), "{err}");
    }
}
