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

//! A logging hook that forwards structured records to Loggly.
//!
//! # Overview
//!
//! A [`Logger`] hands every record to the [`Hook`]s subscribed to the record's level. The
//! [`LogglyHook`](loggly::LogglyHook) turns records into Loggly messages and delivers them in
//! batches through a buffered HTTP [`Client`](loggly::Client). Failed deliveries are reported
//! through a separate fallback logger and returned to the dispatching logger, which passes them
//! to its [`Trap`].
//!
//! # Examples
//!
//! ```no_run
//! use logforth_loggly::hook::Stderr;
//! use logforth_loggly::loggly::LogglyHook;
//! use logforth_loggly::record::Level;
//!
//! let loggly = LogglyHook::new("my-customer-token", "web-1", Level::Warn, ["web"]).unwrap();
//!
//! let logger = logforth_loggly::builder()
//!     .level(Level::Debug)
//!     .hook(Stderr::default())
//!     .hook(loggly)
//!     .build();
//!
//! logger
//!     .with_field("mount", "/var")
//!     .field("free_bytes", 1024)
//!     .warn("disk almost full");
//!
//! // deliver buffered messages before exiting
//! logger.flush();
//! ```
//!
//! With the `bridge-log` feature, the logger can be installed as the global [`log`] logger:
//!
//! ```no_run
//! use logforth_loggly::loggly::LogglyHook;
//! use logforth_loggly::record::Level;
//!
//! let loggly = LogglyHook::new("my-customer-token", "web-1", Level::Info, ["web"]).unwrap();
//! logforth_loggly::builder().hook(loggly).apply();
//!
//! log::info!(user = "alice"; "signed in");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod hook;
pub mod kv;
pub mod layout;
pub mod loggly;
pub mod record;
pub mod trap;

mod bridge;
mod error;
mod logger;

pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::hook::Hook;
pub use self::layout::Layout;
pub use self::logger::Entry;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::logger::builder;
pub use self::trap::Trap;
