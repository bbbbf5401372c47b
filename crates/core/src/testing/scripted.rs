//! Scripted matcher and confirmation gate.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::catalog::AssetRecord;
use crate::matcher::{AssetMatcher, MatchVerdict, MatcherError};
use crate::orchestrator::{ConfirmationGate, Presentation};

/// Matcher returning a fixed verdict, or failing.
#[derive(Debug)]
pub struct ScriptedMatcher {
    verdict: Option<MatchVerdict>,
    calls: AtomicUsize,
}

impl ScriptedMatcher {
    pub fn no_match() -> Self {
        Self::with_verdict(Some(MatchVerdict::NoMatch))
    }

    /// Claims `qualified_name`, whether or not it is among the candidates.
    pub fn matching(qualified_name: &str) -> Self {
        Self::with_verdict(Some(MatchVerdict::Matched(qualified_name.to_string())))
    }

    pub fn failing() -> Self {
        Self::with_verdict(None)
    }

    fn with_verdict(verdict: Option<MatchVerdict>) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetMatcher for ScriptedMatcher {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn find_match(
        &self,
        _request: &str,
        _candidates: &[AssetRecord],
    ) -> Result<MatchVerdict, MatcherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
            .clone()
            .ok_or_else(|| MatcherError::InvalidResponse("scripted failure".to_string()))
    }
}

/// Gate answering from a script. Answers `false` once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedGate {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedGate {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    pub fn times_asked(&self) -> usize {
        self.questions.lock().unwrap().len()
    }
}

#[async_trait]
impl ConfirmationGate for ScriptedGate {
    async fn confirm(&self, presentation: &Presentation<'_>) -> bool {
        self.questions
            .lock()
            .unwrap()
            .push(presentation.question().to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}
