use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::source::{ArticleSource, PageLookup};

pub struct WikipediaClient {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<Query>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    random: Vec<RandomPage>,
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct RandomPage {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    pageprops: Option<PageProps>,
    #[serde(default)]
    links: Vec<Link>,
    extract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    // present (as an empty string) on disambiguation pages
    disambiguation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Link {
    title: String,
}

impl WikipediaClient {
    /// Client for one Wikipedia language edition, e.g. "en".
    pub fn new(lang: &str) -> Result<Self> {
        Self::with_api_url(format!("https://{lang}.wikipedia.org/w/api.php"))
    }

    /// Client against an explicit MediaWiki API endpoint.
    pub fn with_api_url(api_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; CollectArticles/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, api_url })
    }

    async fn query(&self, params: &str) -> Result<Query> {
        let url = format!(
            "{}?action=query&format=json&formatversion=2&{}",
            self.api_url, params
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to the MediaWiki API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("MediaWiki API returned error: {} - {}", status, error_text);
        }

        let body = response
            .json::<ApiResponse>()
            .await
            .context("Failed to parse MediaWiki API response")?;

        if let Some(error) = body.error {
            anyhow::bail!("MediaWiki API error {}: {}", error.code, error.info);
        }

        body.query
            .context("MediaWiki API response carried no query payload")
    }

    fn single_page(mut query: Query) -> Result<Page> {
        if query.pages.is_empty() {
            anyhow::bail!("MediaWiki API response carried no pages");
        }
        Ok(query.pages.remove(0))
    }
}

#[async_trait]
impl ArticleSource for WikipediaClient {
    async fn random_title(&self) -> Result<String> {
        let query = self.query("list=random&rnnamespace=0&rnlimit=1").await?;

        query
            .random
            .into_iter()
            .next()
            .map(|page| page.title)
            .context("Random page query returned no titles")
    }

    async fn page_by_title(&self, title: &str) -> Result<PageLookup> {
        let params = format!(
            "titles={}&redirects=1&prop=pageprops%7Clinks&ppprop=disambiguation&plnamespace=0&pllimit=max",
            urlencoding::encode(title)
        );
        let page = Self::single_page(self.query(&params).await?)?;

        if page.invalid {
            anyhow::bail!("'{title}' is not a valid page title");
        }
        if page.missing {
            return Ok(PageLookup::Missing);
        }
        if page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
        {
            let candidates = page.links.into_iter().map(|link| link.title).collect();
            return Ok(PageLookup::Disambiguation { candidates });
        }

        Ok(PageLookup::Found { title: page.title })
    }

    async fn summary_by_title(&self, title: &str, max_sentences: u8) -> Result<String> {
        // the extracts API accepts 1 to 10 sentences
        let sentences = max_sentences.clamp(1, 10);
        let params = format!(
            "titles={}&redirects=1&prop=extracts&explaintext=1&exsentences={}",
            urlencoding::encode(title),
            sentences
        );
        let page = Self::single_page(self.query(&params).await?)?;

        if page.missing {
            anyhow::bail!("No page found for '{title}'");
        }

        page.extract
            .filter(|text| !text.trim().is_empty())
            .with_context(|| format!("No extract returned for '{title}'"))
    }
}
