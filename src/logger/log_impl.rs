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
use crate::Trap;
use crate::hook::Stderr;
use crate::kv::Key;
use crate::kv::Value;
use crate::logger::Entry;
use crate::record::Level;
use crate::record::Record;

/// A logger facade that hands log records to its hooks.
///
/// A record reaches a hook only when it passes the logger's own level and its level is one of
/// [`Hook::levels`]. A failing hook does not stop the record from reaching the remaining hooks;
/// the error goes to the logger's [`Trap`].
#[derive(Debug)]
pub struct Logger {
    level: Level,
    hooks: Vec<Box<dyn Hook>>,
    trap: Box<dyn Trap>,
}

impl Default for Logger {
    /// A standalone logger writing logfmt lines of `info` and more severe records to stderr.
    fn default() -> Self {
        crate::builder().hook(Stderr::default()).build()
    }
}

impl Logger {
    pub(super) fn new(level: Level, hooks: Vec<Box<dyn Hook>>, trap: Box<dyn Trap>) -> Self {
        Self { level, hooks, trap }
    }

    /// The most verbose level this logger passes to its hooks.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Determine if a record of `level` would be passed to any hook.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level && self.hooks.iter().any(|hook| hook.levels().contains(level))
    }

    /// Log the record.
    pub fn log(&self, record: &Record) {
        let level = record.level();
        if level > self.level {
            return;
        }

        for hook in &self.hooks {
            if !hook.levels().contains(level) {
                continue;
            }

            if let Err(err) = hook.fire(record) {
                let err = Error::new(err.kind(), "failed to fire hook").with_source(err);
                self.trap.trap(&err);
            }
        }
    }

    /// Flush all hooks.
    pub fn flush(&self) {
        for hook in &self.hooks {
            if let Err(err) = hook.flush() {
                let err = Error::new(err.kind(), "failed to flush hook").with_source(err);
                self.trap.trap(&err);
            }
        }
    }

    /// Start an [`Entry`] without fields.
    pub fn entry(&self) -> Entry<'_> {
        Entry::new(self)
    }

    /// Start an [`Entry`] with one field.
    ///
    /// # Examples
    ///
    /// ```
    /// let logger = logforth_loggly::Logger::default();
    /// logger
    ///     .with_field("source", "billing")
    ///     .field("attempt", 3)
    ///     .warn("payment gateway is slow");
    /// ```
    pub fn with_field(&self, key: impl Into<Key>, value: impl Into<Value>) -> Entry<'_> {
        Entry::new(self).field(key, value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::ErrorKind;
    use crate::record::LevelSet;

    #[derive(Debug, Default, Clone)]
    struct Collect {
        records: Arc<Mutex<Vec<(Level, String)>>>,
        levels: LevelSet,
        fail: bool,
    }

    impl Hook for Collect {
        fn levels(&self) -> LevelSet {
            self.levels
        }

        fn fire(&self, record: &Record) -> Result<(), Error> {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.payload().to_owned()));
            if self.fail {
                Err(Error::transport("unreachable"))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Debug, Default, Clone)]
    struct CollectErrors(Arc<Mutex<Vec<String>>>);

    impl Trap for CollectErrors {
        fn trap(&self, err: &Error) {
            assert_eq!(err.kind(), ErrorKind::TransportFailure);
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    #[test]
    fn hooks_receive_only_their_levels() {
        let severe = Collect {
            levels: LevelSet::at_or_above(Level::Error),
            ..Default::default()
        };
        let everything = Collect {
            levels: LevelSet::all(),
            ..Default::default()
        };

        let logger = crate::builder()
            .level(Level::Debug)
            .hook(severe.clone())
            .hook(everything.clone())
            .build();

        logger.entry().error("e");
        logger.entry().info("i");
        logger.entry().trace("t");

        assert_eq!(
            *severe.records.lock().unwrap(),
            vec![(Level::Error, "e".to_string())]
        );
        assert_eq!(
            *everything.records.lock().unwrap(),
            vec![(Level::Error, "e".to_string()), (Level::Info, "i".to_string())]
        );
        assert!(logger.enabled(Level::Debug));
        assert!(!logger.enabled(Level::Trace));
    }

    #[test]
    fn failing_hook_does_not_stop_dispatch() {
        let failing = Collect {
            levels: LevelSet::all(),
            fail: true,
            ..Default::default()
        };
        let healthy = Collect {
            levels: LevelSet::all(),
            ..Default::default()
        };
        let errors = CollectErrors::default();

        let logger = crate::builder()
            .hook(failing.clone())
            .hook(healthy.clone())
            .trap(errors.clone())
            .build();

        logger.entry().warn("disk almost full");

        assert_eq!(failing.records.lock().unwrap().len(), 1);
        assert_eq!(healthy.records.lock().unwrap().len(), 1);
        let errors = errors.0.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("failed to fire hook"), "{}", errors[0]);
        assert!(errors[0].contains("unreachable"), "{}", errors[0]);
    }

    #[test]
    fn entries_above_threshold_are_dropped() {
        let hook = Collect {
            levels: LevelSet::all(),
            ..Default::default()
        };
        let logger = crate::builder().level(Level::Warn).hook(hook.clone()).build();

        logger.with_field("attempt", 1i64).info("dropped");
        logger.entry().log(Level::Debug, "dropped");
        logger.entry().warn("kept");

        assert_eq!(
            *hook.records.lock().unwrap(),
            vec![(Level::Warn, "kept".to_string())]
        );
    }
}
