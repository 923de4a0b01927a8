//! Scriptable collaborators for testing
//!
//! These mocks let pipeline tests run without AWS or real documents. Each
//! can be told what to return per input and can be held at a gate so tests
//! control when a call completes.

use async_trait::async_trait;
use docvault_core::{ExtractionResult, InterpretationResult, SourceFile};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error::{AnalysisError, AnalysisResult};
use crate::traits::{TextExtractor, TextInterpreter};

/// Scripted outcome of a mock call.
#[derive(Debug, Clone)]
pub enum MockOutcome<T> {
    Ok(T),
    Unsupported(String),
    ServiceError(String),
}

impl<T: Clone> MockOutcome<T> {
    fn to_result(&self) -> AnalysisResult<T> {
        match self {
            MockOutcome::Ok(value) => Ok(value.clone()),
            MockOutcome::Unsupported(msg) => Err(AnalysisError::UnsupportedInput(msg.clone())),
            MockOutcome::ServiceError(msg) => Err(AnalysisError::Service(msg.clone())),
        }
    }
}

struct Script<T> {
    default: MockOutcome<T>,
    by_input: HashMap<String, MockOutcome<T>>,
    gates: HashMap<String, Arc<Notify>>,
    calls: Vec<String>,
}

impl<T: Clone> Script<T> {
    fn new(default: MockOutcome<T>) -> Self {
        Self {
            default,
            by_input: HashMap::new(),
            gates: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Record the call and return the gate to wait on plus the scripted outcome.
    fn begin(&mut self, input: &str) -> (Option<Arc<Notify>>, MockOutcome<T>) {
        self.calls.push(input.to_string());
        let outcome = self
            .by_input
            .get(input)
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        (self.gates.get(input).cloned(), outcome)
    }
}

async fn run<T: Clone>(script: &Mutex<Script<T>>, input: &str) -> AnalysisResult<T> {
    let (gate, outcome) = script.lock().unwrap().begin(input);
    if let Some(gate) = gate {
        gate.notified().await;
    }
    outcome.to_result()
}

/// Mock [`TextExtractor`] keyed by file name.
pub struct MockExtractor {
    script: Mutex<Script<ExtractionResult>>,
    received: Mutex<Vec<SourceFile>>,
}

impl MockExtractor {
    /// Every file extracts to `result` unless scripted otherwise.
    pub fn new(result: ExtractionResult) -> Self {
        Self {
            script: Mutex::new(Script::new(MockOutcome::Ok(result))),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Every file is rejected as unsupported unless scripted otherwise.
    pub fn rejecting() -> Self {
        Self {
            script: Mutex::new(Script::new(MockOutcome::Unsupported(
                "not a document".to_string(),
            ))),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, file_name: &str, outcome: MockOutcome<ExtractionResult>) {
        self.script
            .lock()
            .unwrap()
            .by_input
            .insert(file_name.to_string(), outcome);
    }

    /// Calls for `file_name` block until the returned gate is notified.
    pub fn hold(&self, file_name: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script
            .lock()
            .unwrap()
            .gates
            .insert(file_name.to_string(), gate.clone());
        gate
    }

    /// File names passed to `extract`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    /// Files passed to `extract`, content included, in call order.
    pub fn received(&self) -> Vec<SourceFile> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock-extractor"
    }

    async fn extract(&self, file: &SourceFile) -> AnalysisResult<ExtractionResult> {
        self.received.lock().unwrap().push(file.clone());
        run(&self.script, &file.name).await
    }
}

/// Mock [`TextInterpreter`] keyed by the text it is given.
pub struct MockInterpreter {
    script: Mutex<Script<InterpretationResult>>,
}

impl MockInterpreter {
    pub fn new(result: InterpretationResult) -> Self {
        Self {
            script: Mutex::new(Script::new(MockOutcome::Ok(result))),
        }
    }

    /// Every call fails with a service error.
    pub fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(Script::new(MockOutcome::ServiceError(message.to_string()))),
        }
    }

    pub fn respond(&self, text: &str, outcome: MockOutcome<InterpretationResult>) {
        self.script
            .lock()
            .unwrap()
            .by_input
            .insert(text.to_string(), outcome);
    }

    pub fn hold(&self, text: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script
            .lock()
            .unwrap()
            .gates
            .insert(text.to_string(), gate.clone());
        gate
    }

    /// Texts passed to `interpret`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }
}

#[async_trait]
impl TextInterpreter for MockInterpreter {
    fn name(&self) -> &str {
        "mock-interpreter"
    }

    async fn interpret(&self, text: &str) -> AnalysisResult<InterpretationResult> {
        run(&self.script, text).await
    }
}
