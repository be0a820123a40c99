use async_trait::async_trait;
use repo2vec::{
    read_index, Config, Embedder, Embedding, Error, GitRepository, Indexer, OpenAiEmbedder,
    Result, SourceRepository, Usage,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Repository backed by an in-memory file list
struct MemoryRepository {
    files: Vec<(String, String)>,
}

impl MemoryRepository {
    fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(path, content)| (path.to_string(), content.to_string()))
                .collect(),
        }
    }
}

impl SourceRepository for MemoryRepository {
    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.files.iter().map(|(path, _)| path.clone()).collect())
    }

    fn read_file(&self, path: &str) -> Result<String> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| Error::Io(std::io::ErrorKind::NotFound.into()))
    }
}

/// Repository whose listing always fails
struct BrokenRepository;

impl SourceRepository for BrokenRepository {
    fn list_files(&self) -> Result<Vec<String>> {
        Err(Error::Repository("not a git repository".to_string()))
    }

    fn read_file(&self, _path: &str) -> Result<String> {
        unreachable!("listing failed")
    }
}

/// Embeds every chunk except the ones containing `FAIL`
struct FakeEmbedder {
    calls: AtomicUsize,
}

impl FakeEmbedder {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if text.contains("FAIL") {
            return Err(Error::EmbeddingStatus {
                status: 500,
                body: "boom".to_string(),
            });
        }

        Ok(Embedding {
            vector: vec![text.chars().count() as f32, 1.0],
            usage: Usage {
                total_tokens: 10,
                prompt_tokens: 10,
                model: "fake-embedding".to_string(),
            },
        })
    }
}

/// Never answers within any reasonable timeout
struct SlowEmbedder;

#[async_trait]
impl Embedder for SlowEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(Error::Timeout(Duration::from_secs(60)))
    }
}

fn test_config(output_file: PathBuf, max_chunk_characters: usize) -> Config {
    let mut config = Config::new(PathBuf::from("."), output_file, "sk-test".to_string());
    config.max_chunk_characters = max_chunk_characters;
    config
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(root: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

#[tokio::test]
async fn test_failed_chunk_does_not_abort_run() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("index.json");

    let repository = MemoryRepository::new(&[
        ("src/app.ts", "const a = 1;\nconst b = 2;"),
        ("README.md", "# Title\nFAIL here\nlast line"),
        ("config.toml", "[package]\nname = \"x\""),
    ]);
    let embedder = FakeEmbedder::new();
    let indexer = Indexer::new(repository, embedder, &test_config(output_file.clone(), 12));

    let report = indexer.run(&output_file).await?;

    assert_eq!(report.files_indexed, 3);
    assert_eq!(report.chunks_failed, 1);
    assert_eq!(report.chunks_embedded, 6);
    assert_eq!(report.usage.total_tokens, 60);
    assert_eq!(report.usage.requests, 6);

    let index = read_index(&output_file)?;
    assert_eq!(index.len(), 6);
    assert!(index.iter().all(|entry| !entry.content.contains("FAIL")));
    assert!(index.iter().all(|entry| !entry.embedding.is_empty()));

    // Listing order, then chunk order
    let order: Vec<(&str, usize)> = index
        .iter()
        .map(|entry| (entry.file.as_str(), entry.start_position))
        .collect();
    assert_eq!(
        order,
        vec![
            ("src/app.ts", 0),
            ("src/app.ts", 13),
            ("README.md", 0),
            ("README.md", 18),
            ("config.toml", 0),
            ("config.toml", 10),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_output_document_shape() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("index.json");

    let repository = MemoryRepository::new(&[("notes.md", "hello")]);
    let config = test_config(output_file.clone(), 150);
    let indexer = Indexer::new(repository, FakeEmbedder::new(), &config);
    indexer.run(&output_file).await?;

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output_file)?)?;
    assert_eq!(
        json,
        serde_json::json!([{
            "file": "notes.md",
            "content": "hello",
            "startPosition": 0,
            "endPosition": 5,
            "embedding": [5.0, 1.0]
        }])
    );

    Ok(())
}

#[tokio::test]
async fn test_unsupported_files_are_never_read_or_embedded() -> Result<()> {
    let repository = MemoryRepository::new(&[
        ("logo.png", "binary"),
        ("dist/bundle.min.js", "minified"),
        ("pnpm-lock.yaml", "lockfile: true"),
    ]);
    let embedder = FakeEmbedder::new();
    let indexer = Indexer::new(repository, embedder, &test_config("unused.json".into(), 150));

    let outcome = indexer.index().await?;
    assert!(outcome.chunks.is_empty());
    assert_eq!(outcome.report.files_skipped, 3);
    assert_eq!(outcome.report.usage.total_tokens, 0);

    Ok(())
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("index.json");

    let config = test_config(output_file.clone(), 150);
    let indexer = Indexer::new(BrokenRepository, FakeEmbedder::new(), &config);

    assert!(matches!(indexer.run(&output_file).await, Err(Error::Repository(_))));
    assert!(!output_file.exists());
}

#[tokio::test]
async fn test_write_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("missing-dir").join("index.json");

    let repository = MemoryRepository::new(&[("a.md", "text")]);
    let config = test_config(output_file.clone(), 150);
    let indexer = Indexer::new(repository, FakeEmbedder::new(), &config);

    assert!(matches!(indexer.run(&output_file).await, Err(Error::Output(_))));
}

#[tokio::test]
async fn test_timeout_counts_as_failed_chunk() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("index.json");

    let mut config = test_config(output_file.clone(), 150);
    config.request_timeout = Duration::from_millis(20);
    config.max_retries = 0;

    let repository = MemoryRepository::new(&[("a.md", "first"), ("b.md", "second")]);
    let indexer = Indexer::new(repository, SlowEmbedder, &config);

    let report = indexer.run(&output_file).await?;
    assert_eq!(report.chunks_failed, 2);
    assert_eq!(report.chunks_embedded, 0);
    assert!(read_index(&output_file)?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_git_repository_end_to_end() -> Result<()> {
    if !git_available() {
        eprintln!("git not available, skipping");
        return Ok(());
    }

    let temp_dir = TempDir::new().unwrap();
    let repo_dir = temp_dir.path().join("repo");
    fs::create_dir_all(repo_dir.join("src"))?;
    fs::write(repo_dir.join("src/main.rs"), "fn main() {\n    println!(\"hi\");\n}\n")?;
    fs::write(repo_dir.join("README.md"), "# Demo\n")?;
    fs::write(repo_dir.join("logo.png"), "not really a png")?;
    fs::write(repo_dir.join("untracked.md"), "never added")?;

    git(&repo_dir, &["init", "-q"]);
    git(&repo_dir, &["add", "src/main.rs", "README.md", "logo.png"]);

    let repository = GitRepository::new(&repo_dir);
    let mut files = repository.list_files()?;
    files.sort();
    assert_eq!(files, vec!["README.md", "logo.png", "src/main.rs"]);

    let output_file = temp_dir.path().join("index.json");
    let config = test_config(output_file.clone(), 150);
    let indexer = Indexer::new(repository, FakeEmbedder::new(), &config);
    let report = indexer.run(&output_file).await?;

    assert_eq!(report.files_listed, 3);
    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.files_indexed, 2);

    let index = read_index(&output_file)?;
    let mut indexed_files: Vec<&str> = index.iter().map(|entry| entry.file.as_str()).collect();
    indexed_files.sort();
    assert_eq!(indexed_files, vec!["README.md", "src/main.rs"]);

    Ok(())
}

#[tokio::test]
async fn test_pipeline_against_mock_embedding_service() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data": [{"embedding": [0.1, 0.2]}], "model": "text-embedding-ada-002",
                "usage": {"prompt_tokens": 4, "total_tokens": 4}}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("index.json");
    let mut config = test_config(output_file.clone(), 150);
    config.api_base_url = server.url();

    let repository = MemoryRepository::new(&[("a.md", "alpha"), ("b.ts", "beta")]);
    let indexer = Indexer::new(repository, OpenAiEmbedder::new(&config)?, &config);
    let report = indexer.run(&output_file).await?;

    assert_eq!(report.usage.total_tokens, 8);
    assert!((report.usage.estimated_cost_usd() - 8.0 / 1000.0 * 0.0004).abs() < 1e-12);
    assert_eq!(read_index(&output_file)?.len(), 2);
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn test_chunk_survives_transient_failure_through_pipeline() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let unavailable = server
        .mock("POST", "/v1/embeddings")
        .with_status(503)
        .with_body(r#"{"error": {"message": "overloaded"}}"#)
        .expect(1)
        .create_async()
        .await;
    let recovered = server
        .mock("POST", "/v1/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data": [{"embedding": [0.3]}], "model": "text-embedding-ada-002",
                "usage": {"prompt_tokens": 5, "total_tokens": 5}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("index.json");
    let mut config = test_config(output_file.clone(), 150);
    config.api_base_url = server.url();
    // The backoff alone is longer than one request timeout
    config.request_timeout = Duration::from_millis(400);
    config.retry_backoff = Duration::from_millis(500);
    config.max_retries = 2;

    let repository = MemoryRepository::new(&[("a.md", "alpha")]);
    let indexer = Indexer::new(repository, OpenAiEmbedder::new(&config)?, &config);
    let report = indexer.run(&output_file).await?;

    assert_eq!(report.chunks_embedded, 1);
    assert_eq!(report.chunks_failed, 0);
    assert_eq!(report.usage.total_tokens, 5);
    assert_eq!(read_index(&output_file)?[0].embedding, vec![0.3]);
    unavailable.assert_async().await;
    recovered.assert_async().await;

    Ok(())
}
