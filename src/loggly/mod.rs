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

//! Forwarding records to [Loggly](https://www.loggly.com/).

mod client;
mod hook;
mod message;
mod transport;
mod worker;

pub use self::client::Client;
pub use self::client::ClientBuilder;
pub use self::hook::LogglyHook;
pub use self::hook::LogglyHookBuilder;
pub use self::message::Message;
pub use self::transport::Transport;
