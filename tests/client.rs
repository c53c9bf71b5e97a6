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

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Barrier;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use httpmock::Method::POST;
use httpmock::MockServer;
use httpmock::prelude::HttpMockRequest;
use logforth_loggly::Error;
use logforth_loggly::ErrorKind;
use logforth_loggly::Trap;
use logforth_loggly::loggly::Client;
use logforth_loggly::loggly::ClientBuilder;
use logforth_loggly::loggly::Message;
use logforth_loggly::loggly::Transport;
use logforth_loggly::record::Level;
use logforth_loggly::record::Record;

const PATH: &str = "/bulk/token-123/";

#[derive(Debug, Default, Clone)]
struct Trapped(Arc<Mutex<Vec<String>>>);

impl Trap for Trapped {
    fn trap(&self, err: &Error) {
        self.0.lock().unwrap().push(err.to_string());
    }
}

fn message(payload: &str) -> Message {
    let record = Record::builder()
        .level(Level::Error)
        .payload(payload)
        .key_value("attempt", 3i64)
        .build();
    Message::from_record(&record, "web-1")
}

fn body(messages: &[&Message]) -> String {
    messages
        .iter()
        .map(|m| serde_json::to_string(m).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

fn client(server: &MockServer) -> ClientBuilder {
    Client::builder("token-123")
        .endpoint(server.url(PATH))
        .flush_interval(None)
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn flush_posts_newline_joined_batch_with_tags() {
    let server = MockServer::start();
    let (first, second) = (message("first"), message("second"));
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(PATH)
            .header("content-type", "text/plain")
            .header("user-agent", concat!("logforth-loggly/", env!("CARGO_PKG_VERSION")))
            .header("x-loggly-tag", "web,production")
            .body(body(&[&first, &second]));
        then.status(200);
    });

    let client = client(&server).tag("web").build().unwrap();
    client.tag("production");
    client.send(first.clone()).unwrap();
    client.send(second.clone()).unwrap();
    assert_eq!(client.buffered(), 2);
    assert_eq!(mock.hits(), 0);

    client.flush().unwrap();
    mock.assert();
    assert_eq!(client.buffered(), 0);
}

#[test]
fn empty_flush_sends_nothing() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(200);
    });

    let client = client(&server).build().unwrap();
    client.flush().unwrap();
    drop(client);
    assert_eq!(mock.hits(), 0);
}

#[test]
fn non_success_status_is_a_transport_failure() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(503);
    });

    let client = client(&server).build().unwrap();
    client.send(message("lost")).unwrap();

    let err = client.flush().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert!(err.to_string().contains("503"), "{err}");

    // taken messages are not retried
    assert_eq!(client.buffered(), 0);
    client.flush().unwrap();
    assert_eq!(mock.hits(), 1);
}

#[test]
fn unreachable_endpoint_is_a_transport_failure() {
    let client = Client::builder("token-123")
        .endpoint("http://127.0.0.1:9/bulk/token-123/")
        .flush_interval(None)
        .request_timeout(Some(Duration::from_secs(2)))
        .build()
        .unwrap();
    client.send(message("lost")).unwrap();

    let err = client.flush().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert_eq!(err.message(), "failed to send messages");
    assert_eq!(err.sources().len(), 1);
}

#[test]
fn full_buffer_flushes_on_send() {
    let server = MockServer::start();
    let (first, second) = (message("first"), message("second"));
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH).body(body(&[&first, &second]));
        then.status(200);
    });

    let client = client(&server).buffer_size(2).build().unwrap();
    client.send(first.clone()).unwrap();
    assert_eq!(mock.hits(), 0);
    client.send(second.clone()).unwrap();
    mock.assert();
    assert_eq!(client.buffered(), 0);
}

#[test]
fn full_buffer_surfaces_delivery_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(500);
    });

    let client = client(&server).buffer_size(1).build().unwrap();
    let err = client.send(message("lost")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
}

#[test]
fn drop_flushes_remaining_messages() {
    let server = MockServer::start();
    let last = message("last words");
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH).body(body(&[&last]));
        then.status(200);
    });

    let client = client(&server).build().unwrap();
    client.send(last.clone()).unwrap();
    drop(client);
    mock.assert();
}

#[test]
fn drop_reports_failed_flush_to_trap() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(400);
    });

    let trapped = Trapped::default();
    let client = client(&server).trap(trapped.clone()).build().unwrap();
    client.send(message("rejected")).unwrap();
    drop(client);

    let trapped = trapped.0.lock().unwrap();
    assert_eq!(trapped.len(), 1);
    assert!(trapped[0].contains("failed to flush messages on drop"), "{}", trapped[0]);
}

#[test]
fn background_worker_flushes_on_interval() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(200);
    });

    let client = client(&server)
        .flush_interval(Some(Duration::from_millis(50)))
        .build()
        .unwrap();
    client.send(message("periodic")).unwrap();

    assert!(wait_for(|| mock.hits() == 1));
    assert_eq!(client.buffered(), 0);
    drop(client);
    assert_eq!(mock.hits(), 1);
}

#[test]
fn background_worker_flushes_on_drop() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(200);
    });

    let client = client(&server)
        .flush_interval(Some(Duration::from_secs(3600)))
        .build()
        .unwrap();
    client.send(message("pending")).unwrap();
    assert_eq!(mock.hits(), 0);

    drop(client);
    mock.assert();
}

#[test]
fn invalid_builder_tag_is_rejected() {
    let err = Client::builder("token-123")
        .tag("web,prod\r\nx-injected: 1")
        .flush_interval(None)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn invalid_runtime_tag_is_trapped_and_delivery_continues() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH).header("x-loggly-tag", "web,ok");
        then.status(200);
    });

    let trapped = Trapped::default();
    let client = client(&server).tag("web").trap(trapped.clone()).build().unwrap();
    client.tag("web\nprod, ok");
    assert_eq!(client.tags(), vec!["web", "ok"]);

    for i in 0..3 {
        client.send(message(&format!("delivered {i}"))).unwrap();
        client.flush().unwrap();
    }
    assert_eq!(mock.hits(), 3);

    let trapped = trapped.0.lock().unwrap();
    assert_eq!(trapped.len(), 1);
    assert!(trapped[0].contains("tag is not a valid header value"), "{}", trapped[0]);
}

#[test]
fn full_buffer_wakes_background_worker() {
    let server = MockServer::start();
    let (first, second) = (message("first"), message("second"));
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH).body(body(&[&first, &second]));
        then.status(200);
    });

    let client = client(&server)
        .buffer_size(2)
        .flush_interval(Some(Duration::from_secs(3600)))
        .build()
        .unwrap();
    client.send(first.clone()).unwrap();
    client.send(second.clone()).unwrap();

    assert!(wait_for(|| mock.hits() == 1));
    assert_eq!(client.buffered(), 0);
}

#[test]
fn woken_flush_failure_goes_to_trap() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(503);
    });

    let trapped = Trapped::default();
    let client = client(&server)
        .buffer_size(1)
        .flush_interval(Some(Duration::from_secs(3600)))
        .trap(trapped.clone())
        .build()
        .unwrap();

    // the delivery happens on the worker, so send itself succeeds
    client.send(message("lost")).unwrap();
    assert!(wait_for(|| !trapped.0.lock().unwrap().is_empty()));
    drop(client);

    assert_eq!(mock.hits(), 1);
    let trapped = trapped.0.lock().unwrap();
    assert_eq!(trapped.len(), 1);
    assert!(trapped[0].contains("failed to flush full buffer"), "{}", trapped[0]);
}

static POSTED_LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn collect_posted_lines(req: &HttpMockRequest) -> bool {
    if let Some(body) = &req.body {
        let body = String::from_utf8_lossy(body);
        POSTED_LINES
            .lock()
            .unwrap()
            .extend(body.lines().map(str::to_owned));
    }
    true
}

#[test]
fn concurrent_sends_are_delivered_exactly_once() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(PATH).matches(collect_posted_lines);
        then.status(200);
    });

    let trapped = Trapped::default();
    let client = Arc::new(
        client(&server)
            .buffer_size(7)
            .flush_interval(Some(Duration::from_millis(5)))
            .trap(trapped.clone())
            .build()
            .unwrap(),
    );

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles = (0..THREADS)
        .map(|t| {
            let client = client.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    client.send(message(&format!("thread {t} message {i}"))).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    client.flush().unwrap();
    let client = Arc::into_inner(client).unwrap();
    drop(client);

    assert!(trapped.0.lock().unwrap().is_empty());

    let lines = POSTED_LINES.lock().unwrap();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    let payloads = lines
        .iter()
        .map(|line| {
            let json: serde_json::Value = serde_json::from_str(line).unwrap();
            json["message"].as_str().unwrap().to_owned()
        })
        .collect::<HashSet<_>>();
    assert_eq!(payloads.len(), THREADS * PER_THREAD);
    for t in 0..THREADS {
        for i in 0..PER_THREAD {
            assert!(payloads.contains(&format!("thread {t} message {i}")));
        }
    }
}
