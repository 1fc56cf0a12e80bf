//! Deterministic evaluator doubles for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::bundle::ReportBundle;
use super::evaluator::{SpecialistEvaluator, SynthesisEvaluator};

/// Returns a fixed report and records every document it was given
pub struct Fixed {
    identity: String,
    report: String,
    seen: Mutex<Vec<String>>,
}

impl Fixed {
    pub fn new(identity: &str, report: &str) -> Self {
        Self {
            identity: identity.to_string(),
            report: report.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_documents(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpecialistEvaluator for Fixed {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn evaluate(&self, document: &str) -> anyhow::Result<String> {
        self.seen.lock().unwrap().push(document.to_string());
        Ok(self.report.clone())
    }
}

/// Sleeps before answering and counts the calls that got past the sleep
pub struct Slow {
    identity: String,
    report: String,
    delay: Duration,
    finished: AtomicUsize,
}

impl Slow {
    pub fn new(identity: &str, report: &str, delay: Duration) -> Self {
        Self {
            identity: identity.to_string(),
            report: report.to_string(),
            delay,
            finished: AtomicUsize::new(0),
        }
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpecialistEvaluator for Slow {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn evaluate(&self, _document: &str) -> anyhow::Result<String> {
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(self.report.clone())
    }
}

/// Panics inside the evaluator task
pub struct Panicking {
    identity: String,
    message: String,
}

impl Panicking {
    pub fn new(identity: &str, message: &str) -> Self {
        Self {
            identity: identity.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl SpecialistEvaluator for Panicking {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn evaluate(&self, _document: &str) -> anyhow::Result<String> {
        panic!("{}", self.message)
    }
}

/// Always errors
pub struct Failing {
    identity: String,
    reason: String,
    calls: AtomicUsize,
}

impl Failing {
    pub fn new(identity: &str, reason: &str) -> Self {
        Self {
            identity: identity.to_string(),
            reason: reason.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpecialistEvaluator for Failing {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn evaluate(&self, _document: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("{}", self.reason)
    }
}

/// Fails the first `failures` calls, then succeeds
pub struct Flaky {
    identity: String,
    report: String,
    failures: usize,
    calls: AtomicUsize,
}

impl Flaky {
    pub fn new(identity: &str, report: &str, failures: usize) -> Self {
        Self {
            identity: identity.to_string(),
            report: report.to_string(),
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpecialistEvaluator for Flaky {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn evaluate(&self, _document: &str) -> anyhow::Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            anyhow::bail!("transient failure #{}", call + 1);
        }
        Ok(self.report.clone())
    }
}

/// Joins reports with a single space, counting invocations
#[derive(Default)]
pub struct Concat {
    calls: AtomicUsize,
}

impl Concat {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisEvaluator for Concat {
    async fn synthesize(&self, bundle: &ReportBundle) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(bundle
            .iter()
            .map(|(_, report)| report)
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Synthesis that always errors
pub struct BrokenSynthesis;

#[async_trait]
impl SynthesisEvaluator for BrokenSynthesis {
    async fn synthesize(&self, _bundle: &ReportBundle) -> anyhow::Result<String> {
        anyhow::bail!("reviewer unavailable")
    }
}
