// Public modules
pub mod collector;
pub mod fetcher;
pub mod source;
pub mod wikipedia;

// Re-export commonly used types
pub use collector::{collect, sanitize_base_name, RunReport};
pub use fetcher::{Article, ArticleFetcher, FetchOutcome};
pub use source::{ArticleSource, PageLookup};
pub use wikipedia::WikipediaClient;
