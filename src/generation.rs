//! Hand-off of crawled pages to a downstream text generator.
//!
//! The crawler never talks to a generator itself. This module turns responses into
//! `(url, text)` pairs and chat conversations, and [`Spider`] strings a scoped crawl
//! and a [`TextGenerator`] together.

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::config::CrawlerConfig;
use crate::crawler::Crawler;
use crate::models::{CrawlRequest, CrawlResponse};

/// One page handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInput {
    pub url: String,
    pub text: String,
}

/// Chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Messages of one chat, in order.
pub type Conversation = Vec<Message>;

/// One generated answer, tied to the page it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiderOutput {
    pub url: String,
    pub content: String,
}

/// A text generator able to answer a batch of conversations.
///
/// Implementations return exactly one answer per conversation, in order.
pub trait TextGenerator {
    fn chat(&self, conversations: &[Conversation]) -> anyhow::Result<Vec<String>>;
}

/// Pairs every successful response with the text to generate from.
///
/// The extracted content is used when extraction succeeded, the raw body otherwise.
/// Failed requests and non-2xx responses are skipped.
pub fn generation_inputs(responses: &[CrawlResponse]) -> Vec<GenerationInput> {
    responses
        .iter()
        .filter(|response| response.is_success())
        .map(|response| {
            let text = match &response.extracted {
                Some(extracted) if extracted.is_success() => extracted.content.clone(),
                _ => response.text.clone(),
            };
            GenerationInput {
                url: response.url.clone(),
                text,
            }
        })
        .collect()
}

/// Builds one conversation per input: the task as system message (when given),
/// then the page as user message.
pub fn build_conversations(inputs: &[GenerationInput], task: Option<&str>) -> Vec<Conversation> {
    inputs
        .iter()
        .map(|input| {
            let mut conversation = Vec::with_capacity(2);
            if let Some(task) = task {
                conversation.push(Message {
                    role: Role::System,
                    content: task.to_string(),
                });
            }
            conversation.push(Message {
                role: Role::User,
                content: format!("URL: {}\n\nContent:\n{}", input.url, input.text),
            });
            conversation
        })
        .collect()
}

/// Crawl-then-generate pipeline.
pub struct Spider<G> {
    crawler: Crawler,
    generator: G,
}

impl<G: TextGenerator> Spider<G> {
    pub fn new(config: CrawlerConfig, generator: G) -> anyhow::Result<Self> {
        let crawler = Crawler::new(config).context("Failed to create crawler")?;
        Ok(Self { crawler, generator })
    }

    pub fn crawler(&self) -> &Crawler {
        &self.crawler
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Fetches `requests` in a scoped session and runs the generator over every
    /// successful page.
    ///
    /// # Errors
    ///
    /// Fails if the session cannot be opened, if the generator fails, or if it
    /// returns a different number of answers than it was given conversations.
    pub async fn crawl(
        &self,
        requests: &[CrawlRequest],
        task: Option<&str>,
    ) -> anyhow::Result<Vec<SpiderOutput>> {
        let responses = {
            let session = self
                .crawler
                .scoped()
                .context("Failed to open crawler session")?;
            session.fetch_all(requests).await?
        };

        let inputs = generation_inputs(&responses);
        log::info!(
            "Generating from {} of {} crawled pages",
            inputs.len(),
            responses.len()
        );
        let conversations = build_conversations(&inputs, task);
        let answers = self
            .generator
            .chat(&conversations)
            .context("Text generation failed")?;
        ensure!(
            answers.len() == inputs.len(),
            "Generator returned {} answers for {} conversations",
            answers.len(),
            inputs.len()
        );

        Ok(inputs
            .into_iter()
            .zip(answers)
            .map(|(input, content)| SpiderOutput {
                url: input.url,
                content,
            })
            .collect())
    }
}
