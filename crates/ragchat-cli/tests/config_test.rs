use std::path::PathBuf;

use ragchat_cli::config::Config;

fn workspace_config(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../config")
        .join(name)
}

#[test]
fn test_shipped_default_config_loads() {
    let config = Config::from_file(workspace_config("default.toml")).unwrap();

    assert_eq!(config.server.url, "http://localhost:8081");
    assert_eq!(config.server.connect_timeout_secs, Some(10));
    assert_eq!(config.generation.vdb_endpoint, "http://milvus:19530");
    assert_eq!(config.generation.reranker_top_k, 2);
    assert!(config.generation.stop.is_empty());
    assert_eq!(config.stream.event_marker, "data: ");
    assert_eq!(
        config.client_config().generate_url(),
        "http://localhost:8081/v1/generate"
    );
}

#[test]
fn test_from_file_with_partial_config() {
    let path = std::env::temp_dir().join(format!("ragchat-cli-test-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
            [server]
            url = "https://rag.example.edu"
            request_timeout_secs = 60

            [generation]
            persona = "ta"
            system_prompt = "Answer from the course material."
        "#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.server.request_timeout_secs, Some(60));
    assert_eq!(config.generation.persona.as_deref(), Some("ta"));
    assert_eq!(config.generation.temperature, 0.7);
    assert_eq!(config.logging.format, "pretty");
}

#[test]
fn test_missing_explicit_config_reports_context() {
    use anyhow::Context;

    let missing = workspace_config("does-not-exist.toml");
    let err = Config::load(Some(&missing))
        .context("Failed to load configuration")
        .unwrap_err();

    let report = format!("{:#}", err);
    assert!(report.starts_with("Failed to load configuration: "));
    assert!(err.chain().count() >= 2);
}
