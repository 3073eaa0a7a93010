use super::*;
use serial_test::serial;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_dir = temp_dir.path().join(".docqa");
    fs::create_dir_all(&config_dir).expect("should create config dir");
    (temp_dir, config_dir)
}

#[test]
fn load_missing_file_returns_defaults() {
    let (_temp, config_dir) = create_test_config_dir();

    let config = Config::load_from(&config_dir).expect("load should succeed");

    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.llm, LlmConfig::default());
    assert_eq!(config.base_dir, config_dir);
    assert_eq!(config.persist_dir(), config_dir.join("vectorstore"));
}

#[test]
fn save_and_reload_round_trip() {
    let (_temp, config_dir) = create_test_config_dir();

    let mut config = Config::load_from(&config_dir).expect("load should succeed");
    config.ollama.model = "all-minilm:latest".to_string();
    config.chunking.chunk_size = 500;
    config.chunking.chunk_overlap = 50;
    config.save().expect("save should succeed");

    let reloaded = Config::load_from(&config_dir).expect("reload should succeed");
    assert_eq!(reloaded.ollama.model, "all-minilm:latest");
    assert_eq!(reloaded.chunking.chunk_size, 500);
    assert_eq!(reloaded.chunking.chunk_overlap, 50);
}

#[test]
fn persist_dir_override() {
    let (_temp, config_dir) = create_test_config_dir();

    let mut config = Config::load_from(&config_dir).expect("load should succeed");
    config.store.persist_dir = Some(PathBuf::from("/tmp/custom-store"));

    assert_eq!(config.persist_dir(), PathBuf::from("/tmp/custom-store"));
}

#[test]
fn rejects_zero_chunk_size() {
    let mut config = Config::default();
    config.chunking.chunk_size = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidChunkSize(0))
    ));
}

#[test]
fn rejects_overlap_not_smaller_than_chunk_size() {
    let mut config = Config::default();
    config.chunking.chunk_size = 100;
    config.chunking.chunk_overlap = 100;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::OverlapTooLarge(100, 100))
    ));
}

#[test]
fn rejects_invalid_ollama_settings() {
    let mut config = Config::default();
    config.ollama.protocol = "ftp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut config = Config::default();
    config.ollama.port = 0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(0))));

    let mut config = Config::default();
    config.ollama.model = "  ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));
}

#[test]
fn rejects_invalid_llm_base_url() {
    let mut config = Config::default();
    config.llm.base_url = "not a url".to_string();

    assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
}

#[test]
#[serial]
fn config_dir_env_override() {
    let (_temp, override_dir) = create_test_config_dir();

    // SAFETY: no other thread reads this variable while the test holds the
    // serial lock.
    unsafe { std::env::set_var(CONFIG_DIR_ENV, &override_dir) };
    let resolved = config_dir().expect("config dir should resolve");
    unsafe { std::env::remove_var(CONFIG_DIR_ENV) };

    assert_eq!(resolved, override_dir);
}

#[test]
fn malformed_toml_is_an_error() {
    let (_temp, config_dir) = create_test_config_dir();
    fs::write(config_dir.join("config.toml"), "this is not toml [").expect("write should succeed");

    assert!(Config::load_from(&config_dir).is_err());
}
