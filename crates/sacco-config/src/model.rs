use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Operator-configurable preferences for the back office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_ledger: Option<String>,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default = "Config::default_recent_transaction_limit")]
    pub recent_transaction_limit: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for ledgers. Defaults to `~/Documents/Sacco/Ledgers`.
    pub default_ledger_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for backups. Defaults to `~/Documents/Sacco/Backups`.
    pub default_backup_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-KE".into(),
            currency: "KES".into(),
            last_opened_ledger: None,
            backup_retention: Self::default_backup_retention(),
            recent_transaction_limit: Self::default_recent_transaction_limit(),
            default_ledger_root: None,
            default_backup_root: None,
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_recent_transaction_limit() -> usize {
        10
    }

    pub fn resolve_default_ledger_root(&self) -> PathBuf {
        if let Some(path) = &self.default_ledger_root {
            return path.clone();
        }
        documents_base().join("Sacco").join("Ledgers")
    }

    pub fn resolve_default_backup_root(&self) -> PathBuf {
        if let Some(path) = &self.default_backup_root {
            return path.clone();
        }
        documents_base().join("Sacco").join("Backups")
    }
}

fn documents_base() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
