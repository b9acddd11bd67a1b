use std::process::Command;
use tempfile::TempDir;

fn lexrag(dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lexrag"));
    command.current_dir(dir).env_remove("RUST_LOG");
    command
}

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();

    let output = lexrag(temp_dir.path())
        .arg("init")
        .output()
        .expect("Failed to run init command");
    assert!(output.status.success());

    let config_path = temp_dir.path().join(".lexrag/settings.toml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[chunking]"));
    assert!(content.contains("chunk_size = 2000"));
    assert!(content.contains("[generation]"));

    // Second init refuses to overwrite
    let output = lexrag(temp_dir.path()).arg("init").output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));

    let output = lexrag(temp_dir.path()).args(["init", "--force"]).output().unwrap();
    assert!(output.status.success());
}

#[test]
fn test_config_command_reads_workspace_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join(".lexrag");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("settings.toml"),
        "version = 2\n[retrieval]\ntop_k = 7\n",
    )
    .unwrap();

    let output = lexrag(temp_dir.path()).arg("config").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("version = 2"));
    assert!(stdout.contains("top_k = 7"));
}

#[test]
fn test_invalid_settings_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    std::fs::write(&config_path, "[chunking]\nchunk_size = 0\n").unwrap();

    let output = lexrag(temp_dir.path())
        .args(["--config", "custom.toml", "config"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("chunk_size"));
}

#[test]
fn test_index_dry_run_writes_no_index() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("ebv.txt"),
        "Vorwort\n§ 1 Zweck. Schutz des Bodens.\n§ 2 Begriffe. Bodenmaterial ist Material.\n",
    )
    .unwrap();

    let output = lexrag(temp_dir.path())
        .args(["index", "--document", "ebv.txt", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 chunks from ebv.txt"));
    assert!(temp_dir.path().join("ebv_bereinigt.txt").exists());
    assert!(!temp_dir.path().join("vector_store").exists());
}

#[test]
fn test_search_without_index_fails_with_hint() {
    let temp_dir = TempDir::new().unwrap();

    let output = lexrag(temp_dir.path())
        .args(["search", "Deponieklasse"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("lexrag index"));
}
