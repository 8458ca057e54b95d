use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::ollama;

use super::Completion;
use crate::config::ModelSettings;
use crate::prelude::*;

const REWRITE_PREAMBLE: &str = "\
You are a technical writer. You receive a slice of a document in which every
block of text is prefixed by a structural tag such as <h1>, <h2>, <p> or <s1>.
Headings are <hN> tags, body text is <p>, small print is <sN>. A '|' marks the
end of a line or block in the source.

Rules:
- Answer with the rewritten documentation only.
- Keep every fact, value, unit and register name from the input.
- Do not repeat the structural tags or the '|' markers in the answer.";

/// Completion backed by a local Ollama model.
pub struct OllamaCompletion {
    client: ollama::Client,
    model: String,
    temperature: f64,
    max_tokens: u64,
}

impl OllamaCompletion {
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.ollama_url)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }
}

fn create_client(ollama_url: &str) -> Result<ollama::Client> {
    use rig::client::Nothing;

    ollama::Client::builder()
        .api_key(Nothing)
        .base_url(ollama_url)
        .build()
        .map_err(|e| eyre!("Failed to create Ollama client: {}", e))
}

impl Completion for OllamaCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(REWRITE_PREAMBLE)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        agent
            .prompt(prompt.to_string())
            .await
            .map_err(|e| eyre!("Model generation failed: {}", e))
    }
}
