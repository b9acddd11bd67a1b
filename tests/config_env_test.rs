use lexrag::Settings;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

// Environment variables are process-wide, so every override case lives in
// this single test.
#[test]
fn test_env_overrides_with_double_underscore() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    std::fs::write(
        &config_path,
        r#"
[chunking]
chunk_size = 1200

[generation]
model = "gpt-4o-mini"
"#,
    )
    .unwrap();

    unsafe {
        // Double underscore separates nesting levels
        env::set_var("LEXRAG_CHUNKING__CHUNK_SIZE", "1500");
        env::set_var("LEXRAG_RETRIEVAL__TOP_K", "8");
        env::set_var("LEXRAG_INDEX__METADATA_PATH", "store/chunks.json");
        env::set_var("LEXRAG_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load_from(&config_path).unwrap();

    unsafe {
        env::remove_var("LEXRAG_CHUNKING__CHUNK_SIZE");
        env::remove_var("LEXRAG_RETRIEVAL__TOP_K");
        env::remove_var("LEXRAG_INDEX__METADATA_PATH");
        env::remove_var("LEXRAG_LOGGING__DEFAULT");
    }

    // Env beats the file, the file beats defaults
    assert_eq!(settings.chunking.chunk_size, 1500);
    assert_eq!(settings.retrieval.top_k, 8);
    assert_eq!(settings.index.metadata_path, PathBuf::from("store/chunks.json"));
    assert_eq!(settings.logging.default, "debug");
    assert_eq!(settings.generation.model, "gpt-4o-mini");
    assert_eq!(settings.chunking.overlap_sentences, 2);
    assert!(settings.validate().is_ok());

    let settings = Settings::load_from(&config_path).unwrap();
    assert_eq!(settings.chunking.chunk_size, 1200);
    assert_eq!(settings.retrieval.top_k, 5);
}
