//! Test double for the generation collaborator.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::generation::Generator;

#[derive(Clone)]
enum Reply {
    Text(String),
    Error(String),
    Stall(Duration),
}

/// Replays a fixed script of replies and counts the calls it receives.
///
/// When the script runs out the last reply is repeated.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    prompts: Mutex<Vec<String>>,
    system_prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            system_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`.
    pub fn always(text: &str) -> Self {
        Self::new().then_reply(text)
    }

    pub fn then_reply(self, text: &str) -> Self {
        self.push(Reply::Text(text.to_string()))
    }

    pub fn then_fail(self, message: &str) -> Self {
        self.push(Reply::Error(message.to_string()))
    }

    /// Sleep for `delay` before answering, to exercise timeouts.
    pub fn then_stall(self, delay: Duration) -> Self {
        self.push(Reply::Stall(delay))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// System instructions received, one per call.
    pub fn system_prompts(&self) -> Vec<String> {
        self.system_prompts.lock().unwrap().clone()
    }

    fn push(self, reply: Reply) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    fn next_reply(&self) -> Option<Reply> {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        match script.pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                Some(reply)
            }
            None => last.clone(),
        }
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        self.system_prompts.lock().unwrap().push(system.to_string());
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.next_reply() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error(message)) => Err(anyhow!(message)),
            Some(Reply::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(String::new())
            }
            None => Err(anyhow!("scripted generator has no replies")),
        }
    }
}
