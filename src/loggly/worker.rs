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

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;

use crate::Error;
use crate::ErrorKind;
use crate::loggly::client::Inner;

/// Flushes the buffer of a client periodically and whenever it is woken, until the client is
/// dropped.
pub(crate) struct Worker {
    inner: Arc<Inner>,
    interval: Duration,
}

impl Worker {
    pub(crate) fn new(inner: Arc<Inner>, interval: Duration) -> Self {
        Self { inner, interval }
    }

    pub(crate) fn spawn(self) -> Result<WorkerState, Error> {
        let (shutdown, shutdown_rx) = crossbeam_channel::bounded(0);
        // one pending wake-up is enough, the flush takes the whole buffer
        let (wake, wake_rx) = crossbeam_channel::bounded(1);
        let handle = std::thread::Builder::new()
            .name("loggly-flush".to_string())
            .spawn(move || self.run(shutdown_rx, wake_rx))
            .map_err(|err| {
                Error::new(ErrorKind::Unexpected, "failed to spawn loggly flush thread")
                    .with_source(err)
            })?;

        Ok(WorkerState {
            shutdown,
            wake,
            handle,
        })
    }

    fn run(self, shutdown: Receiver<()>, wake: Receiver<()>) {
        let ticker = crossbeam_channel::tick(self.interval);

        loop {
            crossbeam_channel::select! {
                recv(ticker) -> _ => self.flush("failed to flush messages in background"),
                recv(wake) -> msg => match msg {
                    Ok(()) => self.flush("failed to flush full buffer"),
                    Err(_) => break,
                },
                // never sent on; disconnects when the client drops its sender
                recv(shutdown) -> _ => break,
            }
        }

        self.flush("failed to flush messages on shutdown");
    }

    fn flush(&self, context: &'static str) {
        if let Err(err) = self.inner.flush() {
            let err = Error::new(err.kind(), context).with_source(err);
            self.inner.trap.trap(&err);
        }
    }
}

#[derive(Debug)]
pub(crate) struct WorkerState {
    shutdown: Sender<()>,
    wake: Sender<()>,
    handle: JoinHandle<()>,
}

impl WorkerState {
    /// Ask the worker to flush without waiting for the next tick.
    pub(crate) fn wake(&self) {
        // a full channel means a flush is already pending
        let _ = self.wake.try_send(());
    }

    /// Stop the worker and wait for its final flush.
    pub(crate) fn shutdown(self) {
        let WorkerState {
            shutdown,
            wake,
            handle,
        } = self;

        // drop our senders, the worker will break the loop and flush once more
        drop(shutdown);
        drop(wake);
        let _ = handle.join();
    }
}
