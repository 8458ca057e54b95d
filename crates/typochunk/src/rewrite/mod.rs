//! Chunk processor: hand every heading chunk to a text-generation model.

mod ollama;

use std::time::Instant;

use futures::future::try_join_all;
use serde::Serialize;
use typochunk_core::budget::{split_for_budget, ContextBudget};
use typochunk_core::prompt::build_rewrite_prompt;
use typochunk_core::retry::RetryConfig;
use typochunk_core::{HeadingChunks, Tag};

use crate::config::Settings;
use crate::prelude::{eprintln, println, *};
use crate::source::DocumentArgs;

pub use ollama::OllamaCompletion;

#[derive(Debug, clap::Parser)]
pub struct RewriteOptions {
    #[clap(flatten)]
    pub document: DocumentArgs,

    /// Only rewrite the chunks of this heading tag (e.g. h2)
    #[clap(long)]
    pub tag: Option<Tag>,

    /// Rewrite at most this many chunks per heading tag
    #[clap(long)]
    pub max_chunks: Option<usize>,

    /// Ollama base URL
    #[clap(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Model used for rewriting
    #[clap(long, env = "TYPOCHUNK_MODEL")]
    pub model: Option<String>,
}

/// A single prompt-in, text-out model call.
#[allow(async_fn_in_trait)]
pub trait Completion {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewrittenChunk {
    pub index: usize,
    pub source_chars: usize,
    /// One answer per budget-sized piece, in order.
    pub pieces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewrittenSection {
    pub tag: Tag,
    pub chunks: Vec<RewrittenChunk>,
}

/// Everything a rewrite run needs besides the model.
#[derive(Debug, Clone, Copy)]
pub struct RewritePlan<'a> {
    pub instruction: &'a str,
    pub budget: &'a ContextBudget,
    pub retry: &'a RetryConfig,
    pub max_chunks: Option<usize>,
}

pub async fn run(options: RewriteOptions, settings: Settings, global: crate::Global) -> Result<()> {
    let mut model = settings.model.clone();
    if let Some(url) = options.ollama_url {
        model.ollama_url = url;
    }
    if let Some(name) = options.model {
        model.model = name;
    }

    let structure = options.document.analyze(&settings)?;
    let sections = crate::report::select_sections(&structure, options.tag)?;

    if global.verbose {
        eprintln!("Ollama URL: {}", model.ollama_url);
        eprintln!("Model: {}", model.model);
        eprintln!("Context limit: {} chars", settings.budget.limit());
        for section in &sections {
            eprintln!("{}: {} chunks", section.tag, section.chunks.len());
        }
    }

    let completion = OllamaCompletion::new(&model)?;
    let plan = RewritePlan {
        instruction: &model.instruction,
        budget: &settings.budget,
        retry: &settings.retry,
        max_chunks: options.max_chunks,
    };

    let start = Instant::now();
    let rewritten = rewrite_sections(&completion, &sections, &plan).await?;
    log::info!(
        "rewrote {} sections in {:.1?}",
        rewritten.len(),
        start.elapsed()
    );

    println!("{}", serde_json::to_string_pretty(&rewritten)?);

    Ok(())
}

/// Rewrite every section. Sections run concurrently; the chunks of one
/// section run one after the other.
pub async fn rewrite_sections<C: Completion>(
    completion: &C,
    sections: &[&HeadingChunks],
    plan: &RewritePlan<'_>,
) -> Result<Vec<RewrittenSection>> {
    try_join_all(
        sections
            .iter()
            .map(|section| rewrite_section(completion, section, plan)),
    )
    .await
}

async fn rewrite_section<C: Completion>(
    completion: &C,
    section: &HeadingChunks,
    plan: &RewritePlan<'_>,
) -> Result<RewrittenSection> {
    let limit = plan.max_chunks.unwrap_or(usize::MAX);
    let mut chunks = Vec::new();

    for (index, chunk) in section.chunks.iter().take(limit).enumerate() {
        log::debug!("{} chunk {}: {} chars", section.tag, index, chunk.chars().count());
        let pieces = rewrite_chunk(completion, chunk, plan).await.wrap_err_with(|| {
            format!("Failed to rewrite chunk {} of {}", index, section.tag)
        })?;
        chunks.push(RewrittenChunk {
            index,
            source_chars: chunk.chars().count(),
            pieces,
        });
    }

    Ok(RewrittenSection {
        tag: section.tag,
        chunks,
    })
}

/// Split `chunk` to fit the budget and submit the pieces in order.
pub async fn rewrite_chunk<C: Completion>(
    completion: &C,
    chunk: &str,
    plan: &RewritePlan<'_>,
) -> Result<Vec<String>> {
    let mut answers = Vec::new();
    for piece in split_for_budget(chunk, plan.budget) {
        let prompt = build_rewrite_prompt(plan.instruction, &piece);
        answers.push(complete_with_retry(completion, &prompt, plan.retry).await?);
    }
    Ok(answers)
}

/// Call `completion` until it succeeds or `retry` runs out of attempts.
pub async fn complete_with_retry<C: Completion>(
    completion: &C,
    prompt: &str,
    retry: &RetryConfig,
) -> Result<String> {
    let mut attempt = 1;
    loop {
        match completion.complete(prompt).await {
            Ok(answer) => return Ok(answer),
            Err(err) if retry.should_retry(attempt) => {
                let delay = retry.delay_for(attempt);
                log::warn!(
                    "completion attempt {} failed: {}; retrying in {:?}",
                    attempt,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(Error::RetriesExhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                }
                .into())
            }
        }
    }
}
