use anyhow::Result;
use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Chat;
use rig::providers::{openai, openrouter};
use tracing::debug;

use crate::config::{AdvisorConfig, LlmProvider};

/// The text-generation collaborator: system instructions plus one user
/// prompt in, raw model text out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

enum ProviderClient {
    OpenAi(openai::Client),
    OpenRouter(openrouter::Client),
}

/// [`Generator`] backed by a hosted chat model through `rig`.
pub struct RigGenerator {
    client: ProviderClient,
    model: String,
}

impl RigGenerator {
    pub fn new(config: &AdvisorConfig) -> Self {
        let client = match config.provider {
            LlmProvider::OpenAi => ProviderClient::OpenAi(openai::Client::new(&config.api_key)),
            LlmProvider::OpenRouter => {
                ProviderClient::OpenRouter(openrouter::Client::new(&config.api_key))
            }
        };
        Self {
            client,
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl Generator for RigGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generation request");

        // Each call is a fresh single-turn conversation.
        let reply = match &self.client {
            ProviderClient::OpenAi(client) => {
                let agent = client.agent(&self.model).preamble(system).build();
                agent.chat(prompt, vec![]).await?
            }
            ProviderClient::OpenRouter(client) => {
                let agent = client.agent(&self.model).preamble(system).build();
                agent.chat(prompt, vec![]).await?
            }
        };

        Ok(reply)
    }
}
