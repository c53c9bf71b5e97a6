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

use crate::Logger;
use crate::kv::Key;
use crate::kv::KeyValues;
use crate::kv::Value;
use crate::record::Level;
use crate::record::RecordBuilder;

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

pub(crate) fn level_to_filter(level: Level) -> log::LevelFilter {
    match level {
        Level::Panic | Level::Fatal | Level::Error => log::LevelFilter::Error,
        Level::Warn => log::LevelFilter::Warn,
        Level::Info => log::LevelFilter::Info,
        Level::Debug => log::LevelFilter::Debug,
        Level::Trace => log::LevelFilter::Trace,
    }
}

// `log` lends errors out by reference only, so keep their description.
#[derive(Debug)]
struct BridgedError(String);

impl fmt::Display for BridgedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BridgedError {}

fn to_value(value: &log::kv::Value) -> Value {
    if let Some(err) = value.to_borrowed_error() {
        return Value::from_error(BridgedError(err.to_string()));
    }
    if let Some(b) = value.to_bool() {
        return Value::Bool(b);
    }
    if let Some(n) = value.to_i64() {
        return Value::I64(n);
    }
    if let Some(n) = value.to_u64() {
        return Value::U64(n);
    }
    if let Some(n) = value.to_f64() {
        return Value::F64(n);
    }
    if let Some(s) = value.to_borrowed_str() {
        return Value::from(s.to_owned());
    }
    Value::from_display(value)
}

struct KeyValueVisitor<'a> {
    kvs: &'a mut KeyValues,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KeyValueVisitor<'_> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.kvs
            .insert(Key::from(key.as_str().to_owned()), to_value(&value));
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if level > self.level() {
            return;
        }

        let mut kvs = KeyValues::default();
        let mut visitor = KeyValueVisitor { kvs: &mut kvs };
        // the visitor never fails
        let _ = record.key_values().visit(&mut visitor);

        let record = RecordBuilder::default()
            .level(level)
            .payload(record.args().to_string())
            .key_values(kvs)
            .build();

        Logger::log(self, &record);
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}
