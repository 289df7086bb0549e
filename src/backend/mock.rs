//! Deterministic backend for tests.
//!
//! Responses are a pure function of the prompt, so repeated runs over
//! structurally identical trees produce identical summaries. Failures can
//! be scripted globally or per prompt substring, and every prompt is
//! recorded in call order for traversal-order assertions.

use super::{BackendError, TextGenerationBackend};
use async_trait::async_trait;
use std::sync::Mutex;

/// Scripted, deterministic text-generation backend.
pub struct MockBackend {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
    fail_all: bool,
}

impl MockBackend {
    /// A backend that always succeeds.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            fail_all: false,
        }
    }

    /// A backend that fails every call.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    /// A backend that fails exactly the calls whose prompt contains `needle`.
    pub fn fail_when_contains(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::new()
        }
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Pure function of the prompt: a short tag plus an FNV-1a digest.
    fn respond(prompt: &str) -> String {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in prompt.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100_0000_01b3);
        }
        format!("summary-{:016x}", hash)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(prompt.to_string());

        let should_fail = self.fail_all
            || self
                .fail_on
                .as_deref()
                .is_some_and(|needle| prompt.contains(needle));

        if should_fail {
            return Err(BackendError::Connect("mock".to_string()));
        }

        Ok(Self::respond(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn test_mock_is_deterministic() {
        let backend = MockBackend::new();
        let a = block_on(backend.generate("same prompt")).unwrap();
        let b = block_on(backend.generate("same prompt")).unwrap();
        assert_eq!(a, b);
        assert_eq!(backend.call_count(), 2);
    }

    #[test]
    fn test_mock_scripted_failure() {
        let backend = MockBackend::fail_when_contains("bad");
        assert!(block_on(backend.generate("good prompt")).is_ok());
        assert!(block_on(backend.generate("bad prompt")).is_err());
    }
}
