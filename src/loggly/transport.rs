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

use std::fmt;

use crate::Error;
use crate::loggly::Message;

/// Delivers [`Message`]s to Loggly.
///
/// Implementations are shared by every thread that logs, so they must be safe for concurrent
/// use. [`Client`](crate::loggly::Client) is the HTTP implementation.
pub trait Transport: fmt::Debug + Send + Sync + 'static {
    /// Submit one message. It may be buffered until the next [`Transport::flush`].
    fn send(&self, message: Message) -> Result<(), Error>;

    /// Deliver all buffered messages.
    fn flush(&self) -> Result<(), Error>;

    /// Add comma-separated tags to subsequent deliveries.
    fn tag(&self, tags: &str);
}
