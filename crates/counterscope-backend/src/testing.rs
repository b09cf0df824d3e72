//! Scripted backends for tests
//!
//! Deterministic `ChatBackend` implementations so protocol and
//! pipeline behavior can be exercised without a live provider.

use crate::client::ChatBackend;
use async_trait::async_trait;
use counterscope_core::{ChatTurn, Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replays a fixed script of replies (or faults) in order.
///
/// Once the script is exhausted every further call fails, which makes
/// over-calling visible in tests.
pub struct ScriptedBackend {
    script: Mutex<std::vec::IntoIter<std::result::Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Create a backend that replays `script` in order
    pub fn new(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, _turns: &[ChatTurn]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.script.lock().unwrap().next() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(fault)) => Err(Error::backend(fault)),
            None => Err(Error::backend("script exhausted")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Classifies by keyword: speeches containing `HATE` are hate speech,
/// `COUNTER` counter-hate, `GARBLED` an unparseable reply; everything
/// else is neutral.
///
/// Only the quoted speech under evaluation is inspected, not the whole
/// prompt — conditioned questions embed the hate ancestor's text, which
/// must not leak into the decision.
pub struct KeywordBackend {
    calls: AtomicUsize,
}

/// Pull the speech under evaluation out of a classification prompt
pub fn prompt_subject(prompt: &str) -> &str {
    for marker in ["Is this reply '", "Is this speech '"] {
        if let Some(start) = prompt.find(marker) {
            let rest = &prompt[start + marker.len()..];
            if let Some(end) = rest.find('\'') {
                return &rest[..end];
            }
        }
    }
    prompt
}

/// Keyword classification shared by the test backends
pub fn keyword_reply(prompt: &str) -> String {
    let subject = prompt_subject(prompt);
    if subject.contains("GARBLED") {
        "no label here".to_string()
    } else if subject.contains("COUNTER") {
        "counter hate speech, because it pushes back".to_string()
    } else if subject.contains("HATE") {
        "hate speech, because it attacks a group".to_string()
    } else {
        "neutral speech, because it is unrelated".to_string()
    }
}

impl KeywordBackend {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for KeywordBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for KeywordBackend {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let prompt = turns
            .last()
            .map(|turn| turn.content.as_str())
            .unwrap_or_default();
        Ok(keyword_reply(prompt))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Fails every call, for exercising retry-exhaustion paths
pub struct FailingBackend;


#[async_trait]
impl ChatBackend for FailingBackend {
    async fn complete(&self, _turns: &[ChatTurn]) -> Result<String> {
        Err(Error::backend("permanently unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
