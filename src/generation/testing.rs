//! In-process stub client for unit tests.

use super::{GenerationClient, GenerationRequest};
use crate::errors::GenerationError;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync>;

/// Answers every request with a closure and records what it was asked.
pub struct StubClient {
    respond: Responder,
    fail_first: AtomicU32,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl StubClient {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            fail_first: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A stub whose first `n` calls fail with a backend error.
    pub fn failing_first<F>(n: u32, respond: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        let stub = Self::new(respond);
        stub.fail_first.store(n, Ordering::SeqCst);
        stub
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for StubClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(request.clone());
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::SeqCst);
            return Err(GenerationError::backend("stub transient failure"));
        }
        (self.respond)(request)
    }
}
