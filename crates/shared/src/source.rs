use anyhow::Result;
use async_trait::async_trait;

/// What a title resolves to on the remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLookup {
    /// The page exists; `title` is the canonical form after redirects.
    Found { title: String },
    /// No page behind the title.
    Missing,
    /// The title names a disambiguation page; `candidates` are the listed
    /// target pages, in listed order.
    Disambiguation { candidates: Vec<String> },
}

/// Remote content lookup. Each operation can fail independently.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// A uniformly random main-namespace article title.
    async fn random_title(&self) -> Result<String>;

    /// Resolve `title` exactly, without fuzzy correction.
    async fn page_by_title(&self, title: &str) -> Result<PageLookup>;

    /// A plain-text summary of at most `max_sentences` sentences.
    async fn summary_by_title(&self, title: &str, max_sentences: u8) -> Result<String>;
}
