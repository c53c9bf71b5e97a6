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

use serde::Serialize;

use crate::record::Record;

/// A message in the JSON shape Loggly ingests.
///
/// Serializes to exactly five keys:
///
/// ```json
/// {
///   "timestamp": "2024-03-01T12:30:45.123456789Z",
///   "level": "WARN",
///   "message": "disk almost full",
///   "host": "web-1",
///   "data": { "mount": "/var" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    timestamp: String,
    level: String,
    message: String,
    host: String,
    data: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Build the message for `record` as reported by `host`.
    ///
    /// The timestamp is rendered in UTC with nanosecond precision. Error values in the record's
    /// key-values are replaced with their textual description.
    pub fn from_record(record: &Record, host: &str) -> Self {
        let data = record
            .key_values()
            .iter()
            .map(|(k, v)| (k.as_str().to_owned(), v.to_json()))
            .collect();

        Message {
            timestamp: format!("{:.9}", record.time()),
            level: record.level().as_str().to_ascii_uppercase(),
            message: record.payload().to_owned(),
            host: host.to_owned(),
            data,
        }
    }

    /// UTC timestamp in RFC 3339 with a nine-digit fraction.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Uppercase level name.
    pub fn level(&self) -> &str {
        &self.level
    }

    /// The log message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The host label.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The structured fields.
    pub fn data(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.data
    }
}
