use anyhow::Result;

use crate::source::{ArticleSource, PageLookup};

/// One article as returned by the remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: String,
}

/// The result of a single fetch attempt. Every attempt resolves to one of
/// these; errors never escape the fetcher itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(Article),
    /// The sampled title has no page behind it.
    NotFound,
    /// A disambiguation that the single candidate retry could not settle.
    Ambiguous(String),
    /// Anything else: network failure, malformed response, rate limiting.
    Other(String),
}

enum Resolved {
    Article(Article),
    Missing,
    Disambiguated(Vec<String>),
}

pub struct ArticleFetcher<S> {
    source: S,
}

impl<S: ArticleSource> ArticleFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch one random article with a summary of at most `sentences`
    /// sentences.
    pub async fn fetch_random(&self, sentences: u8) -> FetchOutcome {
        let title = match self.source.random_title().await {
            Ok(title) => title,
            Err(e) => return FetchOutcome::Other(format!("random title lookup failed: {e}")),
        };

        match self.resolve_and_summarize(&title, sentences).await {
            Ok(Resolved::Article(article)) => FetchOutcome::Success(article),
            Ok(Resolved::Missing) => FetchOutcome::NotFound,
            Ok(Resolved::Disambiguated(candidates)) => {
                let Some(candidate) = candidates.into_iter().next() else {
                    return FetchOutcome::Other(format!(
                        "disambiguation page '{title}' listed no candidates"
                    ));
                };
                println!("Disambiguation encountered. Trying '{candidate}'.");
                // one retry with the first candidate, never deeper
                match self.resolve_and_summarize(&candidate, sentences).await {
                    Ok(Resolved::Article(article)) => FetchOutcome::Success(article),
                    Ok(Resolved::Missing) | Ok(Resolved::Disambiguated(_)) => {
                        FetchOutcome::Ambiguous(candidate)
                    }
                    Err(e) => {
                        FetchOutcome::Other(format!("retry with '{candidate}' failed: {e}"))
                    }
                }
            }
            Err(e) => FetchOutcome::Other(e.to_string()),
        }
    }

    async fn resolve_and_summarize(&self, title: &str, sentences: u8) -> Result<Resolved> {
        match self.source.page_by_title(title).await? {
            PageLookup::Missing => Ok(Resolved::Missing),
            PageLookup::Disambiguation { candidates } => Ok(Resolved::Disambiguated(candidates)),
            PageLookup::Found { title: canonical } => {
                let summary = self.source.summary_by_title(&canonical, sentences).await?;
                Ok(Resolved::Article(Article {
                    title: canonical,
                    summary,
                }))
            }
        }
    }
}
