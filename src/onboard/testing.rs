//! Scripted prompt and transport doubles shared by onboarding unit tests.

use super::local::probe::{ListingResponse, ModelListTransport};
use super::prompter::{Prompter, SelectParams, TextParams};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct PromptLog {
    events: Vec<&'static str>,
    notes: Vec<(String, String)>,
    selects: Vec<SelectParams>,
    texts: Vec<TextParams>,
}

/// Records every prompt and answers from a script.
///
/// Unscripted selects answer `continue` when offered, else the initial value.
/// Unscripted texts answer with their initial value.
#[derive(Default)]
pub struct RecordingPrompter {
    log: Mutex<PromptLog>,
    select_answers: Mutex<VecDeque<String>>,
    text_answers: Mutex<VecDeque<String>>,
}

impl RecordingPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selects<const N: usize>(self, answers: [&str; N]) -> Self {
        self.select_answers
            .lock()
            .extend(answers.iter().map(|a| (*a).to_string()));
        self
    }

    pub fn with_texts<const N: usize>(self, answers: [&str; N]) -> Self {
        self.text_answers
            .lock()
            .extend(answers.iter().map(|a| (*a).to_string()));
        self
    }

    /// `(title, body)` pairs in call order.
    pub fn notes(&self) -> Vec<(String, String)> {
        self.log.lock().notes.clone()
    }

    pub fn selects(&self) -> Vec<SelectParams> {
        self.log.lock().selects.clone()
    }

    pub fn texts(&self) -> Vec<TextParams> {
        self.log.lock().texts.clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.log.lock().events.clone()
    }
}

#[async_trait]
impl Prompter for RecordingPrompter {
    async fn note(&self, body: &str, title: &str) -> Result<()> {
        let mut log = self.log.lock();
        log.events.push("note");
        log.notes.push((title.to_string(), body.to_string()));
        Ok(())
    }

    async fn select(&self, params: SelectParams) -> Result<String> {
        let answer = self.select_answers.lock().pop_front().unwrap_or_else(|| {
            if params.options.iter().any(|o| o.value == "continue") {
                "continue".to_string()
            } else {
                params
                    .initial_value
                    .clone()
                    .or_else(|| params.options.first().map(|o| o.value.clone()))
                    .unwrap_or_default()
            }
        });
        let mut log = self.log.lock();
        log.events.push("select");
        log.selects.push(params);
        Ok(answer)
    }

    async fn text(&self, params: TextParams) -> Result<String> {
        let answer = self
            .text_answers
            .lock()
            .pop_front()
            .or_else(|| params.initial_value.clone())
            .unwrap_or_default();
        let mut log = self.log.lock();
        log.events.push("text");
        log.texts.push(params);
        Ok(answer)
    }
}

/// Transport replaying scripted answers; the last one repeats forever.
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<std::result::Result<ListingResponse, String>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<std::result::Result<ListingResponse, String>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn refusing() -> Self {
        Self::new(vec![Err("connect ECONNREFUSED".into())])
    }

    pub fn listing(ids: &[&str]) -> Self {
        Self::new(vec![Ok(listing_response(ids))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn listing_response(ids: &[&str]) -> ListingResponse {
    let data: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| serde_json::json!({ "id": id }))
        .collect();
    ListingResponse {
        status: 200,
        body: serde_json::json!({ "data": data }).to_string(),
    }
}

#[async_trait]
impl ModelListTransport for ScriptedTransport {
    async fn get(&self, _url: &str) -> Result<ListingResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock();
            if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            }
        };
        match step {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no scripted response")),
        }
    }
}
