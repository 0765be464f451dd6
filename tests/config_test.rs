//! Integration tests for configuration files feeding attach options

use memory_edit::config::{validate_config, Config, ConfigError, ConfigLoader};
use memory_edit::{AttachOptions, BackendKind, MemoryError};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory-edit.toml");
    fs::write(
        &path,
        r#"
[memory]
exclude_patterns = ["/usr/lib/**", "*.so"]

[backend]
preferred = "ptrace"
"#,
    )
    .unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config.memory.default_exclusions, vec!["/dev/dri/", "Proton"]);
    assert_eq!(config.memory.max_read_size, 64 * 1024 * 1024);
    assert_eq!(config.backend.proc_root, "/proc");
    assert_eq!(config.logging.level, "info");

    let options = AttachOptions::from_config(&config).unwrap();
    assert_eq!(options.backend, Some(BackendKind::PtraceAndProcMem));
    assert_eq!(options.exclude_patterns, vec!["/usr/lib/**", "*.so"]);
}

#[test]
fn test_custom_exclusions_and_root() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
[memory]
default_exclusions = ["/dev/nvidia"]
max_read_size = 4096

[backend]
proc_root = "/tmp/fake-proc"
"#,
    )
    .unwrap();

    let options = AttachOptions::from_config(&ConfigLoader::new(&path).load().unwrap()).unwrap();
    assert_eq!(options.backend, None);
    assert_eq!(options.default_exclusions, vec!["/dev/nvidia"]);
    assert_eq!(options.max_read_size, 4096);
    assert_eq!(options.proc_root, PathBuf::from("/tmp/fake-proc"));
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new(dir.path().join("saved.toml"));

    let mut config = Config::default();
    config.backend.preferred = "vectorized".to_string();
    config.memory.exclude_patterns = vec!["[vdso]".to_string()];
    loader.save(&config).unwrap();

    let reloaded = loader.load().unwrap();
    assert_eq!(reloaded.backend.preferred, "vectorized");
    assert_eq!(reloaded.memory.exclude_patterns, vec!["[vdso]"]);
}

#[test]
fn test_missing_and_broken_files() {
    let dir = TempDir::new().unwrap();

    let missing = ConfigLoader::new(dir.path().join("absent.toml"));
    assert!(matches!(missing.load(), Err(ConfigError::FileNotFound(_))));
    assert_eq!(missing.load_or_default().backend.preferred, "auto");

    let broken_path = dir.path().join("broken.toml");
    fs::write(&broken_path, "[memory\nmax_read_size = ").unwrap();
    let broken = ConfigLoader::new(&broken_path);
    assert!(matches!(broken.load(), Err(ConfigError::TomlParse(_))));
    assert_eq!(broken.load_or_default().memory.max_read_size, 64 * 1024 * 1024);
}

#[test]
fn test_unknown_backend_is_a_config_error() {
    let mut config = Config::default();
    config.backend.preferred = "kernel-module".to_string();
    assert!(validate_config(&config).is_err());
    assert!(matches!(
        AttachOptions::from_config(&config),
        Err(MemoryError::Config(ConfigError::Invalid(_)))
    ));
}
