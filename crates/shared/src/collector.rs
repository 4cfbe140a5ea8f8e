use anyhow::{Context, Result};
use rand::Rng;
use std::fs;
use std::path::Path;

use crate::fetcher::{ArticleFetcher, FetchOutcome};
use crate::source::ArticleSource;

/// Counters from one collection run.
#[derive(Debug)]
pub struct RunReport {
    pub files_created: u32,
    pub attempts: u64,
    /// True when the attempt cap ran out before the target was reached.
    pub exhausted: bool,
}

/// Make a title safe to use as a file name: spaces and slashes become
/// underscores, parentheses are dropped, and the result is capped at 30
/// characters.
pub fn sanitize_base_name(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| match c {
            ' ' | '/' => Some('_'),
            '(' | ')' => None,
            other => Some(other),
        })
        .take(30)
        .collect()
}

/// Fetch random articles until `target_count` summaries have been written
/// under `output_dir`, one file per article. Failed attempts are logged and
/// retried; with no `max_attempts` cap the loop runs until it succeeds.
pub async fn collect<S, R>(
    fetcher: &ArticleFetcher<S>,
    rng: &mut R,
    output_dir: &Path,
    target_count: u32,
    max_attempts: Option<u64>,
) -> Result<RunReport>
where
    S: ArticleSource,
    R: Rng,
{
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let mut files_created: u32 = 0;
    let mut attempts: u64 = 0;

    println!("Starting to generate {target_count} files with random article summaries...\n");

    while files_created < target_count {
        if let Some(cap) = max_attempts {
            if attempts >= cap {
                eprintln!(
                    "⚠ Giving up after {attempts} attempts with {files_created}/{target_count} files written."
                );
                return Ok(RunReport {
                    files_created,
                    attempts,
                    exhausted: true,
                });
            }
        }
        attempts += 1;

        let sentences: u8 = rng.gen_range(4..=7);
        let article = match fetcher.fetch_random(sentences).await {
            FetchOutcome::Success(article) => article,
            FetchOutcome::NotFound => {
                println!("Page not found for random article. Retrying...");
                continue;
            }
            FetchOutcome::Ambiguous(candidate) => {
                println!("Could not settle disambiguation via '{candidate}'. Retrying...");
                continue;
            }
            FetchOutcome::Other(message) => {
                println!("An error occurred: {message}. Skipping...");
                continue;
            }
        };

        files_created += 1;
        let base_name = sanitize_base_name(&article.title);
        let suffix: u32 = rng.gen_range(0..10_000);
        let file_name = format!("{files_created:03}_{base_name}_{suffix:04}.txt");
        let path = output_dir.join(&file_name);

        if let Err(e) = fs::write(&path, &article.summary) {
            eprintln!("Error creating file {}: {e}", path.display());
            // a failed write does not count toward the target
            files_created -= 1;
            continue;
        }

        // progress every 10 files to avoid clutter
        if files_created % 10 == 0 {
            println!(
                "✓ File {files_created}/{target_count} created ({}).",
                article.title
            );
        }
    }

    println!("\nGeneration completed. Created {files_created} files in {attempts} attempts.");

    Ok(RunReport {
        files_created,
        attempts,
        exhausted: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PageLookup;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Source whose first `fail_first` attempts land on a missing page and
    /// which succeeds on every attempt after that.
    struct FlakySource {
        fail_first: u64,
        calls: Mutex<u64>,
    }

    impl FlakySource {
        fn reliable() -> Self {
            Self::new(0)
        }

        fn new(fail_first: u64) -> Self {
            Self {
                fail_first,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ArticleSource for FlakySource {
        async fn random_title(&self) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls <= self.fail_first {
                Ok("Ghost Page".to_string())
            } else {
                Ok("Stub Article".to_string())
            }
        }

        async fn page_by_title(&self, title: &str) -> Result<PageLookup> {
            match title {
                "Ghost Page" => Ok(PageLookup::Missing),
                "Stub Article" => Ok(PageLookup::Found {
                    title: "Stub Article".to_string(),
                }),
                other => Err(anyhow!("unexpected title '{other}'")),
            }
        }

        async fn summary_by_title(&self, _title: &str, _max_sentences: u8) -> Result<String> {
            Ok("A short test summary.".to_string())
        }
    }

    /// Source whose first article title cannot be written as a file name
    /// (embedded NUL); every later article is fine.
    struct BadTitleFirstSource {
        calls: Mutex<u64>,
    }

    impl BadTitleFirstSource {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ArticleSource for BadTitleFirstSource {
        async fn random_title(&self) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                Ok("Bad\0Title".to_string())
            } else {
                Ok("Good Title".to_string())
            }
        }

        async fn page_by_title(&self, title: &str) -> Result<PageLookup> {
            Ok(PageLookup::Found {
                title: title.to_string(),
            })
        }

        async fn summary_by_title(&self, _title: &str, _max_sentences: u8) -> Result<String> {
            Ok("A short test summary.".to_string())
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    // ==================== Sanitization Tests ====================

    #[test]
    fn test_sanitize_replaces_spaces_and_slashes() {
        assert_eq!(sanitize_base_name("Foo Bar/Baz"), "Foo_Bar_Baz");
    }

    #[test]
    fn test_sanitize_strips_parentheses() {
        assert_eq!(sanitize_base_name("Mercury (planet)"), "Mercury_planet");
    }

    #[test]
    fn test_sanitize_truncates_to_thirty_chars() {
        let title = "Foo (Bar)/Baz Very Long Title Exceeding Thirty Chars";
        assert_eq!(sanitize_base_name(title), "Foo_Bar_Baz_Very_Long_Title_Ex");
    }

    #[test]
    fn test_sanitize_counts_characters_not_bytes() {
        let title = "é".repeat(40);
        assert_eq!(sanitize_base_name(&title), "é".repeat(30));
    }

    #[test]
    fn test_sanitize_keeps_short_titles_unchanged() {
        assert_eq!(sanitize_base_name("Cats"), "Cats");
    }

    // ==================== Collection Loop Tests ====================

    #[tokio::test]
    async fn test_collect_creates_exactly_target_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("data");
        let fetcher = ArticleFetcher::new(FlakySource::reliable());
        let mut rng = StdRng::seed_from_u64(7);

        let report = collect(&fetcher, &mut rng, &out, 5, None).await.unwrap();

        assert_eq!(report.files_created, 5);
        assert_eq!(report.attempts, 5);
        assert!(!report.exhausted);

        let names = file_names(&out);
        assert_eq!(names.len(), 5);
        for (i, name) in names.iter().enumerate() {
            assert!(
                name.starts_with(&format!("{:03}_Stub_Article_", i + 1)),
                "unexpected file name {name}"
            );
            assert!(name.ends_with(".txt"));
        }

        let content = fs::read_to_string(out.join(&names[0])).unwrap();
        assert_eq!(content, "A short test summary.");
    }

    #[tokio::test]
    async fn test_collect_retries_past_failed_lookups() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("data");
        let fetcher = ArticleFetcher::new(FlakySource::new(3));
        let mut rng = StdRng::seed_from_u64(11);

        let report = collect(&fetcher, &mut rng, &out, 4, None).await.unwrap();

        assert_eq!(report.files_created, 4);
        assert_eq!(report.attempts, 7); // 3 misses, then 4 hits
        assert_eq!(file_names(&out).len(), 4);
    }

    #[tokio::test]
    async fn test_collect_gives_up_when_attempt_cap_runs_out() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("data");
        let fetcher = ArticleFetcher::new(FlakySource::new(u64::MAX));
        let mut rng = StdRng::seed_from_u64(13);

        let report = collect(&fetcher, &mut rng, &out, 2, Some(6)).await.unwrap();

        assert!(report.exhausted);
        assert_eq!(report.files_created, 0);
        assert_eq!(report.attempts, 6);
        assert!(file_names(&out).is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_does_not_count_toward_target() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("data");
        let fetcher = ArticleFetcher::new(BadTitleFirstSource::new());
        let mut rng = StdRng::seed_from_u64(5);

        let report = collect(&fetcher, &mut rng, &out, 1, None).await.unwrap();

        assert_eq!(report.files_created, 1);
        assert_eq!(report.attempts, 2); // the unwritable article is retried
        let names = file_names(&out);
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("001_Good_Title_"));
    }

    #[tokio::test]
    async fn test_collect_twice_into_same_directory_overwrites() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("data");
        let fetcher = ArticleFetcher::new(FlakySource::reliable());

        let mut rng = StdRng::seed_from_u64(3);
        collect(&fetcher, &mut rng, &out, 3, None).await.unwrap();

        // the same seed draws the same suffixes, so every name collides
        let mut rng = StdRng::seed_from_u64(3);
        let report = collect(&fetcher, &mut rng, &out, 3, None).await.unwrap();

        assert_eq!(report.files_created, 3);
        assert_eq!(file_names(&out).len(), 3);
    }
}
