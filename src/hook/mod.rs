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

//! Hooks that receive log records from a [`Logger`](crate::Logger).

use std::fmt;

use crate::Error;
use crate::record::LevelSet;
use crate::record::Record;

mod stdio;

pub use self::stdio::Stderr;

/// A handler the logger invokes for every record whose level is in [`Hook::levels`].
pub trait Hook: fmt::Debug + Send + Sync + 'static {
    /// The levels this hook subscribes to.
    ///
    /// The logger consults this before every [`Hook::fire`], so it must be cheap and stable.
    fn levels(&self) -> LevelSet;

    /// Process a log record.
    fn fire(&self, record: &Record) -> Result<(), Error>;

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Hook> From<T> for Box<dyn Hook> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
