//! Filesystem JSON persistence for ledgers.
//!
//! One `<slug>.json` per ledger under the ledgers directory; snapshots under
//! `backups/<slug>/<stamp>[_<note>].json`. Every write goes through a temp
//! file and a rename, and saving over an existing ledger snapshots it first.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sacco_core::{
    storage::{ledger_warnings, LedgerBackupInfo, LedgerStorage},
    CoreError,
};
use sacco_domain::Ledger;

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const STAMP_LEN: usize = 15;
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Clone)]
pub struct JsonLedgerStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// Listing row for one stored ledger.
#[derive(Debug, Clone)]
pub struct LedgerMetadata {
    pub slug: String,
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub member_count: usize,
    pub account_count: usize,
    pub transaction_count: usize,
    pub loan_count: usize,
}

/// Listing row for one backup file.
#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl JsonLedgerStorage {
    pub fn new(ledgers_dir: PathBuf, backups_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(ledgers_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        ledgers_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        fs::create_dir_all(&ledgers_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            ledgers_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir.join(format!("{}.json", slug(name)))
    }

    pub fn backup_path(&self, name: &str, backup: &str) -> PathBuf {
        self.backups_dir.join(slug(name)).join(backup)
    }

    /// Loads a ledger together with any dangling-reference warnings found
    /// in the file.
    pub fn load_ledger_checked(&self, name: &str) -> Result<(Ledger, Vec<String>), CoreError> {
        let ledger = self.load_ledger(name)?;
        let warnings = ledger_warnings(&ledger);
        Ok((ledger, warnings))
    }

    /// Rows for every stored ledger, sorted by display name.
    pub fn list_ledger_metadata(&self) -> Result<Vec<LedgerMetadata>, CoreError> {
        let mut rows = Vec::new();
        for name in self.list_ledgers()? {
            let ledger = self.load_ledger(&name)?;
            rows.push(LedgerMetadata {
                path: self.ledger_path(&name),
                slug: name,
                name: ledger.name,
                created_at: ledger.created_at,
                updated_at: ledger.updated_at,
                member_count: ledger.members.len(),
                account_count: ledger.accounts.len(),
                transaction_count: ledger.transactions.len(),
                loan_count: ledger.loans.len(),
            });
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    pub fn list_backup_metadata(&self, name: &str) -> Result<Vec<BackupMetadata>, CoreError> {
        Ok(self
            .list_backups(name)?
            .into_iter()
            .map(|info| BackupMetadata {
                created_at: backup_stamp(&info.id),
                size_bytes: fs::metadata(&info.path).map(|m| m.len()).unwrap_or(0),
                name: info.id,
                path: info.path,
            })
            .collect())
    }

    pub fn delete_backup(&self, name: &str, backup_id: &str) -> Result<(), CoreError> {
        let path = self.backup_path(name, backup_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Copies the current ledger file into the backup directory before it
    /// gets overwritten or deleted.
    fn snapshot_current_file(&self, name: &str) -> Result<(), CoreError> {
        let current = self.ledger_path(name);
        if !current.exists() {
            return Ok(());
        }
        let dir = self.backups_dir.join(slug(name));
        fs::create_dir_all(&dir)?;
        let file_name = format!("{}.json", Utc::now().format(STAMP_FORMAT));
        fs::copy(&current, dir.join(file_name))?;
        self.prune(name)
    }

    fn prune(&self, name: &str) -> Result<(), CoreError> {
        for stale in self.list_backups(name)?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(stale.path);
        }
        Ok(())
    }
}

impl LedgerStorage for JsonLedgerStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        self.snapshot_current_file(name)?;
        write_ledger(&self.ledger_path(name), ledger)
    }

    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError> {
        read_ledger(&self.ledger_path(name))
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        if !self.ledgers_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&self.ledgers_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json")
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(String::from)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn delete_ledger(&self, name: &str) -> Result<(), CoreError> {
        let path = self.ledger_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn save_ledger_to_path(&self, ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
        write_ledger(path, ledger)
    }

    fn load_ledger_from_path(&self, path: &Path) -> Result<Ledger, CoreError> {
        read_ledger(path)
    }

    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        let dir = self.backups_dir.join(slug(name));
        fs::create_dir_all(&dir)?;
        let stamp = Utc::now().format(STAMP_FORMAT).to_string();
        let mut file_name = stamp.clone();
        if let Some(label) = note.and_then(note_slug) {
            file_name.push('_');
            file_name.push_str(&label);
        }
        file_name.push_str(".json");
        let path = dir.join(&file_name);
        write_ledger(&path, ledger)?;
        self.prune(name)?;
        Ok(LedgerBackupInfo {
            ledger: slug(name),
            id: file_name,
            created_at: stamp,
            path,
        })
    }

    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let ledger_slug = slug(name);
        let dir = self.backups_dir.join(&ledger_slug);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            entries.push(LedgerBackupInfo {
                ledger: ledger_slug.clone(),
                id: file_name.to_string(),
                created_at: file_name
                    .get(..STAMP_LEN)
                    .unwrap_or(file_name)
                    .to_string(),
                path: path.clone(),
            });
        }
        // Newest first; prune drops from the tail.
        entries.sort_by(|a, b| backup_stamp(&b.id).cmp(&backup_stamp(&a.id)));
        Ok(entries)
    }

    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let target = self.ledgers_dir.join(format!("{}.json", backup.ledger));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&backup.path, &target)?;
        read_ledger(&target)
    }
}

fn write_ledger(path: &Path, ledger: &Ledger) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(ledger)
        .map_err(|err| CoreError::Serde(err.to_string()))?;
    // Write-then-rename so a crash never leaves a half-written ledger.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_ledger(path: &Path) -> Result<Ledger, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Lowercased alphanumeric runs joined by underscores; `ledger` when nothing
/// usable remains.
fn slug(name: &str) -> String {
    let parts: Vec<String> = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
        .collect();
    if parts.is_empty() {
        "ledger".into()
    } else {
        parts.join("_")
    }
}

/// Lowercased alphanumeric runs joined by dashes; None when nothing usable
/// remains.
fn note_slug(note: &str) -> Option<String> {
    let parts: Vec<String> = note
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("-"))
    }
}

fn backup_stamp(file_name: &str) -> Option<DateTime<Utc>> {
    let stamp = file_name.strip_suffix(".json").unwrap_or(file_name);
    let stamp = stamp.get(..STAMP_LEN)?;
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
