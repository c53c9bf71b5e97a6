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

use std::io::Write;

use crate::Error;
use crate::hook::Hook;
use crate::layout::Layout;
use crate::layout::LogfmtLayout;
use crate::record::LevelSet;
use crate::record::Record;

/// A hook that writes formatted records to stderr.
#[derive(Debug)]
pub struct Stderr {
    layout: Box<dyn Layout>,
    levels: LevelSet,
}

impl Default for Stderr {
    fn default() -> Self {
        Self {
            layout: Box::new(LogfmtLayout::default()),
            levels: LevelSet::all(),
        }
    }
}

impl Stderr {
    /// Set the layout for the [`Stderr`] hook.
    ///
    /// Default to [`LogfmtLayout`].
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logforth_loggly::hook::Stderr;
    /// use logforth_loggly::layout::LogfmtLayout;
    ///
    /// let hook = Stderr::default().with_layout(LogfmtLayout::default().timezone(TimeZone::UTC));
    /// ```
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Restrict the levels written by this hook.
    ///
    /// Default to all levels.
    pub fn with_levels(mut self, levels: LevelSet) -> Self {
        self.levels = levels;
        self
    }
}

impl Hook for Stderr {
    fn levels(&self) -> LevelSet {
        self.levels
    }

    fn fire(&self, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');
        std::io::stderr()
            .write_all(&bytes)
            .map_err(Error::from_io_error)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::from_io_error)?;
        Ok(())
    }
}
