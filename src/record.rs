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

//! Log records and their severity levels.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;

use crate::Error;
use crate::kv::Key;
use crate::kv::KeyValues;
use crate::kv::Value;

/// The payload of a log message, along with the time it was observed, its level and structured
/// key-values.
#[derive(Clone, Debug)]
pub struct Record {
    // the observed time
    time: Timestamp,

    // the metadata
    level: Level,

    // the payload
    payload: String,

    // structural logging
    kvs: KeyValues,
}

impl Record {
    /// The observed time.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The verbosity level of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message body.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The key-values.
    pub fn key_values(&self) -> &KeyValues {
        &self.kvs
    }

    /// Create a builder initialized with the current record's values.
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            record: self.clone(),
        }
    }

    /// Returns a new builder.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }
}

/// Builder for [`Record`].
///
/// # Examples
///
/// ```
/// use logforth_loggly::record::Level;
/// use logforth_loggly::record::RecordBuilder;
///
/// let record = RecordBuilder::default()
///     .level(Level::Warn)
///     .payload("disk almost full")
///     .key_value("mount", "/var")
///     .build();
///
/// assert_eq!(record.level(), Level::Warn);
/// assert_eq!(record.key_values().len(), 1);
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                time: Timestamp::now(),
                level: Level::Info,
                payload: String::new(),
                kvs: KeyValues::default(),
            },
        }
    }
}

impl RecordBuilder {
    /// Set [`time`](Record::time).
    pub fn time(mut self, time: Timestamp) -> Self {
        self.record.time = time;
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`payload`](Record::payload).
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.record.payload = payload.into();
        self
    }

    /// Append one key-value pair. A pair with an existing key replaces the previous value.
    pub fn key_value(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.record.kvs.insert(key.into(), value.into());
        self
    }

    /// Set [`key_values`](Record::key_values).
    pub fn key_values(mut self, kvs: impl Into<KeyValues>) -> Self {
        self.record.kvs = kvs.into();
        self
    }

    /// Invoke the builder and return a `Record`
    pub fn build(self) -> Record {
        self.record
    }
}

/// An enum representing the available verbosity levels of the logger.
///
/// A lower value is more severe: `Panic < Fatal < Error < Warn < Info < Debug < Trace`.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// The application is about to panic.
    Panic,
    /// The application is about to exit.
    Fatal,
    /// Designates very serious errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
    /// Designates very low priority, often extremely verbose, information.
    Trace,
}

impl Level {
    const ALL: [Level; 7] = [
        Level::Panic,
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Panic => "panic",
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }

    /// Whether the level is one of the two most severe levels, after which the process is
    /// expected to terminate.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Level::Panic | Level::Fatal)
    }

    /// Iterate all levels from the most severe to the most verbose.
    pub fn iter() -> impl Iterator<Item = Level> {
        Self::ALL.into_iter()
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("panic", Level::Panic),
            ("fatal", Level::Fatal),
            ("error", Level::Error),
            ("warn", Level::Warn),
            ("warning", Level::Warn),
            ("info", Level::Info),
            ("debug", Level::Debug),
            ("trace", Level::Trace),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::invalid_config(format!("malformed level: {s:?}")))
    }
}

/// A fixed set of [`Level`]s, e.g., the levels a hook subscribes to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LevelSet(u8);

impl LevelSet {
    /// A set without any level.
    pub const fn empty() -> Self {
        LevelSet(0)
    }

    /// A set with every level.
    pub const fn all() -> Self {
        LevelSet((1 << Level::ALL.len()) - 1)
    }

    /// The set of levels at least as severe as `min`.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_loggly::record::Level;
    /// use logforth_loggly::record::LevelSet;
    ///
    /// let levels = LevelSet::at_or_above(Level::Warn);
    /// assert!(levels.contains(Level::Panic));
    /// assert!(levels.contains(Level::Warn));
    /// assert!(!levels.contains(Level::Info));
    /// ```
    pub fn at_or_above(min: Level) -> Self {
        Level::iter().filter(|level| *level <= min).collect()
    }

    /// Whether the set contains `level`.
    pub fn contains(&self, level: Level) -> bool {
        self.0 & Self::bit(level) != 0
    }

    /// Add `level` to the set.
    pub fn insert(&mut self, level: Level) {
        self.0 |= Self::bit(level);
    }

    /// Whether the set has no levels.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of levels in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the levels in the set from the most severe to the most verbose.
    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        Level::iter().filter(|level| self.contains(*level))
    }

    fn bit(level: Level) -> u8 {
        1 << (level as u8)
    }
}

impl FromIterator<Level> for LevelSet {
    fn from_iter<I: IntoIterator<Item = Level>>(iter: I) -> Self {
        let mut set = LevelSet::empty();
        for level in iter {
            set.insert(level);
        }
        set
    }
}

impl fmt::Debug for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
