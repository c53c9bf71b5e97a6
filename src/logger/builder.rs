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

use crate::Hook;
use crate::Logger;
use crate::Trap;
use crate::record::Level;
use crate::trap::DefaultTrap;

/// Create a new empty [`LoggerBuilder`].
pub fn builder() -> LoggerBuilder {
    LoggerBuilder {
        level: Level::Info,
        hooks: vec![],
        trap: Box::new(DefaultTrap::default()),
    }
}

/// A builder for configuring a [`Logger`].
#[must_use = "call `build` to construct a logger instance or `apply` to set the global logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    level: Level,
    hooks: Vec<Box<dyn Hook>>,
    trap: Box<dyn Trap>,
}

impl LoggerBuilder {
    /// Set the most verbose level the logger passes to its hooks.
    ///
    /// Default to [`Level::Info`].
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Register a hook.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_loggly::hook::Stderr;
    ///
    /// let logger = logforth_loggly::builder().hook(Stderr::default()).build();
    /// logger.entry().info("hello");
    /// ```
    pub fn hook(mut self, hook: impl Into<Box<dyn Hook>>) -> Self {
        self.hooks.push(hook.into());
        self
    }

    /// Set the trap for errors returned by hooks.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Build the [`Logger`].
    pub fn build(self) -> Logger {
        Logger::new(self.level, self.hooks, self.trap)
    }

    /// Set up the global [`log`] logger with the configured hooks.
    ///
    /// This should be called early in the execution of a Rust program. Any log events that occur
    /// before initialization will be ignored.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    #[cfg(feature = "bridge-log")]
    pub fn try_apply(self) -> Result<(), log::SetLoggerError> {
        let logger = self.build();
        let max_level = crate::bridge::log::level_to_filter(logger.level());
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(max_level);
        Ok(())
    }

    /// Set up the global [`log`] logger with the configured hooks.
    ///
    /// # Panics
    ///
    /// Panic if the global logger has already been set.
    #[cfg(feature = "bridge-log")]
    pub fn apply(self) {
        self.try_apply()
            .expect("LoggerBuilder::apply must be called before the global logger initialized");
    }
}
