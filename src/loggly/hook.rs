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

use crate::Error;
use crate::Hook;
use crate::Logger;
use crate::loggly::Client;
use crate::loggly::Message;
use crate::loggly::Transport;
use crate::record::Level;
use crate::record::LevelSet;
use crate::record::Record;

/// A hook that forwards records to Loggly.
///
/// Every record becomes one [`Message`] submitted through the [`Transport`]. When a submission
/// fails, the hook reports the failure through its fallback [`Logger`], a logger separate from
/// the one this hook is registered with, and returns the error. Records at [`Level::Fatal`] and
/// [`Level::Panic`] are flushed right away, since the process is expected to end.
///
/// # Examples
///
/// ```no_run
/// use logforth_loggly::loggly::LogglyHook;
/// use logforth_loggly::record::Level;
///
/// let hook = LogglyHook::new("my-customer-token", "web-1", Level::Warn, ["web"]).unwrap();
/// let logger = logforth_loggly::builder().hook(hook).build();
///
/// logger
///     .with_field("mount", "/var")
///     .warn("disk almost full");
/// ```
#[derive(Debug)]
pub struct LogglyHook<T = Client> {
    transport: T,
    host: String,
    levels: LevelSet,
    fallback: Logger,
}

impl LogglyHook<Client> {
    /// Create a hook delivering through a new [`Client`] for `token` and `tags`.
    ///
    /// Only records at least as severe as `min_level` are forwarded.
    ///
    /// # Errors
    ///
    /// Return an error if the client cannot be built; see [`ClientBuilder::build`].
    ///
    /// [`ClientBuilder::build`]: crate::loggly::ClientBuilder::build
    pub fn new<S: Into<String>>(
        token: impl Into<String>,
        host: impl Into<String>,
        min_level: Level,
        tags: impl IntoIterator<Item = S>,
    ) -> Result<Self, Error> {
        let client = Client::builder(token).tags(tags).build()?;
        Ok(LogglyHookBuilder::new(host).min_level(min_level).build(client))
    }
}

impl<T: Transport> LogglyHook<T> {
    /// Add comma-separated tags to subsequent deliveries.
    pub fn tag(&self, tags: &str) {
        self.transport.tag(tags);
    }

    /// The host label attached to every message.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Hook for LogglyHook<T> {
    fn levels(&self) -> LevelSet {
        self.levels
    }

    fn fire(&self, record: &Record) -> Result<(), Error> {
        let message = Message::from_record(record, &self.host);

        if let Err(err) = self.transport.send(message) {
            self.fallback
                .with_field("source", "loggly")
                .field("error", err.to_string())
                .warn("Failed to send error to Loggly");
            return Err(err);
        }

        if record.level().is_terminal() {
            // flush failures are not reported; the message has been accepted
            let _ = self.transport.flush();
        }

        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        self.transport.flush()
    }
}

/// A builder for configuring a [`LogglyHook`] around a given [`Transport`].
#[must_use = "call `build` to construct the hook"]
#[derive(Debug)]
pub struct LogglyHookBuilder {
    host: String,
    min_level: Level,
    fallback: Option<Logger>,
}

impl LogglyHookBuilder {
    /// Create a new builder for hooks reporting as `host`.
    pub fn new(host: impl Into<String>) -> Self {
        LogglyHookBuilder {
            host: host.into(),
            min_level: Level::Info,
            fallback: None,
        }
    }

    /// Set the least severe level that is forwarded.
    ///
    /// Default to [`Level::Info`].
    pub fn min_level(mut self, min_level: Level) -> Self {
        self.min_level = min_level;
        self
    }

    /// Set the logger that reports failed deliveries.
    ///
    /// Default to [`Logger::default`], which writes to stderr. It must not contain the hook
    /// being built.
    pub fn fallback(mut self, fallback: Logger) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Build the [`LogglyHook`] delivering through `transport`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use logforth_loggly::loggly::Client;
    /// use logforth_loggly::loggly::LogglyHookBuilder;
    /// use logforth_loggly::record::Level;
    ///
    /// let client = Client::builder("my-customer-token")
    ///     .tag("web,production")
    ///     .request_timeout(Some(Duration::from_secs(5)))
    ///     .flush_interval(None)
    ///     .build()
    ///     .unwrap();
    /// let hook = LogglyHookBuilder::new("web-1")
    ///     .min_level(Level::Error)
    ///     .build(client);
    /// ```
    pub fn build<T: Transport>(self, transport: T) -> LogglyHook<T> {
        LogglyHook {
            transport,
            host: self.host,
            levels: LevelSet::at_or_above(self.min_level),
            fallback: self.fallback.unwrap_or_default(),
        }
    }
}
