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

use crate::Logger;
use crate::kv::Key;
use crate::kv::KeyValues;
use crate::kv::Value;
use crate::record::Level;
use crate::record::RecordBuilder;

/// A log entry under construction, bound to a [`Logger`].
///
/// Entries at [`Level::Panic`] and [`Level::Fatal`] are logged like any other; this crate never
/// panics or exits the process on behalf of the caller.
#[must_use = "call a level method such as `warn` to emit the entry"]
#[derive(Debug)]
pub struct Entry<'a> {
    logger: &'a Logger,
    kvs: KeyValues,
}

impl<'a> Entry<'a> {
    pub(super) fn new(logger: &'a Logger) -> Self {
        Entry {
            logger,
            kvs: KeyValues::default(),
        }
    }

    /// Add a field to the entry.
    pub fn field(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.kvs.insert(key.into(), value.into());
        self
    }

    /// Emit the entry at `level`.
    ///
    /// The logger drops the record when `level` is more verbose than its threshold.
    pub fn log(self, level: Level, payload: impl Into<String>) {
        let record = RecordBuilder::default()
            .level(level)
            .payload(payload)
            .key_values(self.kvs)
            .build();
        self.logger.log(&record);
    }

    /// Emit the entry at [`Level::Panic`].
    pub fn panic(self, payload: impl Into<String>) {
        self.log(Level::Panic, payload)
    }

    /// Emit the entry at [`Level::Fatal`].
    pub fn fatal(self, payload: impl Into<String>) {
        self.log(Level::Fatal, payload)
    }

    /// Emit the entry at [`Level::Error`].
    pub fn error(self, payload: impl Into<String>) {
        self.log(Level::Error, payload)
    }

    /// Emit the entry at [`Level::Warn`].
    pub fn warn(self, payload: impl Into<String>) {
        self.log(Level::Warn, payload)
    }

    /// Emit the entry at [`Level::Info`].
    pub fn info(self, payload: impl Into<String>) {
        self.log(Level::Info, payload)
    }

    /// Emit the entry at [`Level::Debug`].
    pub fn debug(self, payload: impl Into<String>) {
        self.log(Level::Debug, payload)
    }

    /// Emit the entry at [`Level::Trace`].
    pub fn trace(self, payload: impl Into<String>) {
        self.log(Level::Trace, payload)
    }
}
