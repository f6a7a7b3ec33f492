use sacco_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_has_non_empty_fields() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert!(!cfg.locale.is_empty());
    assert!(cfg.backup_retention >= 1);
    assert!(cfg.recent_transaction_limit >= 1);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.currency = "USD".to_string();
    cfg.locale = "en-US".to_string();
    cfg.last_opened_ledger = Some("umoja".to_string());

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.currency, "USD");
    assert_eq!(loaded.locale, "en-US");
    assert_eq!(loaded.last_opened_ledger.as_deref(), Some("umoja"));
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.currency, Config::default().currency);
    assert!(!manager.config_path().exists(), "plain load writes nothing");
}

#[test]
fn load_or_init_writes_the_defaults_on_first_run() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("layout");

    let loaded = manager.load_or_init().expect("init config");
    assert_eq!(loaded.currency, Config::default().currency);
    assert!(manager.config_path().exists(), "defaults persisted to disk");
}

#[test]
fn backups_can_be_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.currency = "TZS".to_string();
    let name = manager
        .backup(&cfg, Some("before rollout"))
        .expect("backup config");
    assert!(name.contains("before-rollout"));

    let backups = manager.list_backups().expect("list backups");
    assert!(backups.contains(&name));

    let restored = manager.restore(&name).expect("restore backup");
    assert_eq!(restored.currency, "TZS");

    let err = manager
        .restore("config_19990101_000000.json")
        .expect_err("unknown backup must fail");
    assert!(matches!(err, ConfigError::MissingBackup(_)));
}

#[test]
fn backups_are_pruned_to_the_configured_retention() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.backup_retention = 2;
    for note in ["first", "second", "third", "fourth"] {
        manager.backup(&cfg, Some(note)).expect("backup config");
    }

    let backups = manager.list_backups().expect("list backups");
    assert!(
        backups.len() <= 2,
        "retention must cap backups, got {}",
        backups.len()
    );
}
