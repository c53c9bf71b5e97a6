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

use std::fmt::Write;

use jiff::tz::TimeZone;

use crate::Error;
use crate::kv::Value;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that formats log record as logfmt key-value pairs.
///
/// Output format:
///
/// ```text
/// time=2025-03-31T21:04:28.986032+08:00 level=info msg="cache warmed" entries=1024
/// time=2025-03-31T21:04:28.991273+08:00 level=warn msg="Failed to send error to Loggly" error="connection refused (TransportFailure)" source=loggly
/// ```
///
/// Key-values follow the `msg` pair, sorted by key.
///
/// # Examples
///
/// ```
/// use logforth_loggly::layout::LogfmtLayout;
///
/// let logfmt_layout = LogfmtLayout::default();
/// ```
#[derive(Default, Debug, Clone)]
pub struct LogfmtLayout {
    tz: Option<TimeZone>,
}

impl LogfmtLayout {
    /// Set the timezone for timestamps.
    ///
    /// Default to the system timezone.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logforth_loggly::layout::LogfmtLayout;
    ///
    /// let layout = LogfmtLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

// The encode logic follows https://github.com/go-logfmt/logfmt/blob/76262ea7/encode.go.
fn encode_key_value(text: &mut String, key: &str, value: &Value) -> Result<(), Error> {
    if key.contains([' ', '=', '"']) {
        // omit keys contain special chars
        return Err(Error::new(
            crate::ErrorKind::Unexpected,
            format!("key contains special chars: {key}"),
        ));
    }

    let value = value.to_string();

    // SAFETY: write to a string always succeeds
    if value.contains([' ', '=', '"']) {
        write!(text, " {key}=\"{}\"", value.escape_debug()).unwrap();
    } else {
        write!(text, " {key}={value}").unwrap();
    }

    Ok(())
}

impl Layout for LogfmtLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let ts = record.time();
        let tz = self.tz.clone().unwrap_or_else(TimeZone::system);
        let offset = tz.to_offset(ts);
        let time = ts.display_with_offset(offset);

        let mut text = format!("time={time:.6}");
        encode_key_value(&mut text, "level", &Value::from(record.level().as_str()))?;
        encode_key_value(&mut text, "msg", &Value::from(record.payload().to_owned()))?;

        let mut kvs = record.key_values().iter().collect::<Vec<_>>();
        kvs.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (key, value) in kvs {
            encode_key_value(&mut text, key.as_str(), value)?;
        }

        Ok(text.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use jiff::Timestamp;

    use super::*;
    use crate::record::Level;
    use crate::record::RecordBuilder;

    fn format(record: &Record) -> String {
        let layout = LogfmtLayout::default().timezone(TimeZone::UTC);
        String::from_utf8(layout.format(record).unwrap()).unwrap()
    }

    #[test]
    fn fields_are_sorted_and_quoted() {
        let time: Timestamp = "2024-03-01T12:30:45.123456789Z".parse().unwrap();
        let record = RecordBuilder::default()
            .time(time)
            .level(Level::Warn)
            .payload("Failed to send error to Loggly")
            .key_value("source", "loggly")
            .key_value("error", Value::from_error(io::Error::other("connection refused")))
            .build();

        let text = format(&record);
        let (time, rest) = text.split_once(' ').unwrap();
        assert!(time.starts_with("time=2024-03-01T12:30:45.123456"), "{time}");
        insta::assert_snapshot!(rest, @r#"level=warn msg="Failed to send error to Loggly" error="connection refused" source=loggly"#);
    }

    #[test]
    fn plain_message_is_not_quoted() {
        let record = RecordBuilder::default()
            .level(Level::Info)
            .payload("started")
            .key_value("port", 8080u16)
            .build();

        let text = format(&record);
        let (_, rest) = text.split_once(' ').unwrap();
        insta::assert_snapshot!(rest, @"level=info msg=started port=8080");
    }

    #[test]
    fn special_keys_are_rejected() {
        let record = RecordBuilder::default()
            .payload("oops")
            .key_value("bad key", 1i64)
            .build();

        let layout = LogfmtLayout::default().timezone(TimeZone::UTC);
        assert!(layout.format(&record).is_err());
    }
}
