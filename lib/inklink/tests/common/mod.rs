//! In-process backend for pipeline tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use inklink::{Error, Payload, RequestConfig, Result, Transport};
use serde_json::json;

type Reply = dyn Fn(&RequestConfig) -> Result<Payload> + Send + Sync;

/// Transport that records every config it receives and answers with `reply`.
#[derive(Clone)]
pub struct FakeBackend {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<RequestConfig>>>,
    reply: Arc<Reply>,
}

impl FakeBackend {
    /// Echo the endpoint back as `{"endpoint": ..., "call": n}`.
    pub fn echo() -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        Self::with_calls(calls, move |config| {
            let n = counter.load(Ordering::SeqCst);
            Ok(Payload::Json(json!({"endpoint": config.endpoint(), "call": n})))
        })
    }

    /// Answer every call with `reply`.
    pub fn replying(reply: impl Fn(&RequestConfig) -> Result<Payload> + Send + Sync + 'static) -> Self {
        Self::with_calls(Arc::new(AtomicUsize::new(0)), reply)
    }

    /// Fail every call with an HTTP error.
    pub fn failing(status: u16) -> Self {
        Self::replying(move |_| Err(Error::http(status, Payload::Json(json!({"message": "nope"})))))
    }

    fn with_calls(
        calls: Arc<AtomicUsize>,
        reply: impl Fn(&RequestConfig) -> Result<Payload> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls,
            seen: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(reply),
        }
    }

    /// Number of calls that reached the backend.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Configs received, in order.
    pub fn seen(&self) -> Vec<RequestConfig> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for FakeBackend {
    async fn send(&self, config: RequestConfig) -> Result<Payload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(config.clone());
        (self.reply)(&config)
    }
}

/// Counter shared with interceptors.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
