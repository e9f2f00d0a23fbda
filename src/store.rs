//! State store - the single owner of accounts, proxies and chats
//!
//! Every mutating operation writes the snapshot straight back to disk,
//! fire-and-forget. A missing or unreadable snapshot on startup is
//! logged and treated as empty, never fatal.

use crate::constants::{APP_DIR, ID_LEN, STATE_FILE};
use crate::models::{Account, Chat, Proxy};
use anyhow::{bail, Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable snapshot shape, shared by the state file and the clipboard
/// export format. `schedules` is reserved: always written empty,
/// accepted and ignored on read.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accounts: Option<HashMap<String, Account>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxies: Option<HashMap<String, Proxy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chats: Option<HashMap<String, Chat>>,
    #[serde(default)]
    schedules: HashMap<String, serde_json::Value>,
}

impl Snapshot {
    fn has_known_collection(&self) -> bool {
        self.accounts.is_some() || self.proxies.is_some() || self.chats.is_some()
    }
}

/// Manages the three entity collections and their persisted snapshot
pub struct Store {
    pub accounts: HashMap<String, Account>,
    pub proxies: HashMap<String, Proxy>,
    pub chats: HashMap<String, Chat>,
    state_path: PathBuf,
}

impl Store {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self::with_dir(&config_dir)
    }

    /// Open a store rooted at an explicit directory (used by tests)
    pub fn with_dir(dir: &Path) -> Self {
        let mut store = Store {
            accounts: HashMap::new(),
            proxies: HashMap::new(),
            chats: HashMap::new(),
            state_path: dir.join(STATE_FILE),
        };

        if let Err(e) = store.load() {
            tracing::warn!(path = %store.state_path.display(), error = %e, "Could not load saved state, starting empty");
        }
        store
    }

    /// Load the persisted snapshot if one exists, merging present
    /// collections into the defaults
    fn load(&mut self) -> Result<()> {
        if !self.state_path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&self.state_path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        self.apply(snapshot);
        tracing::info!(path = %self.state_path.display(), "Loaded saved state");
        Ok(())
    }

    /// Write the snapshot to disk. Failures are logged, not propagated:
    /// the in-memory state is already mutated and stays authoritative.
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            tracing::error!(path = %self.state_path.display(), error = %e, "Failed to persist state");
        }
    }

    fn try_persist(&self) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = self.export_snapshot()?;
        fs::write(&self.state_path, content)?;
        Ok(())
    }

    fn apply(&mut self, snapshot: Snapshot) {
        if let Some(accounts) = snapshot.accounts {
            self.accounts = accounts;
        }
        if let Some(proxies) = snapshot.proxies {
            self.proxies = proxies;
        }
        if let Some(chats) = snapshot.chats {
            self.chats = chats;
        }
    }

    // ========================
    // Upserts
    // ========================

    /// Insert or overwrite an account; returns its id
    pub fn upsert_account(&mut self, mut account: Account) -> String {
        if account.id.is_empty() {
            account.id = self.fresh_id();
        }
        let id = account.id.clone();
        self.accounts.insert(id.clone(), account);
        self.persist();
        id
    }

    /// Insert or overwrite a proxy; returns its id
    pub fn upsert_proxy(&mut self, mut proxy: Proxy) -> String {
        if proxy.id.is_empty() {
            proxy.id = self.fresh_id();
        }
        let id = proxy.id.clone();
        self.proxies.insert(id.clone(), proxy);
        self.persist();
        id
    }

    /// Insert or overwrite a chat; returns its id
    pub fn upsert_chat(&mut self, mut chat: Chat) -> String {
        if chat.id.is_empty() {
            chat.id = self.fresh_id();
        }
        let id = chat.id.clone();
        self.chats.insert(id.clone(), chat);
        self.persist();
        id
    }

    // ========================
    // Deletes
    // ========================

    /// Delete an account and clear the `account_id` of any chat that
    /// referenced it. Chats themselves are never removed.
    pub fn delete_account(&mut self, id: &str) {
        if self.accounts.remove(id).is_none() {
            return;
        }
        for chat in self.chats.values_mut() {
            if chat.account_id.as_deref() == Some(id) {
                chat.account_id = None;
            }
        }
        self.persist();
    }

    /// Delete a proxy and clear the `proxy` of any account that
    /// referenced it
    pub fn delete_proxy(&mut self, id: &str) {
        if self.proxies.remove(id).is_none() {
            return;
        }
        for account in self.accounts.values_mut() {
            if account.proxy.as_deref() == Some(id) {
                account.proxy = None;
            }
        }
        self.persist();
    }

    /// Delete a chat
    pub fn delete_chat(&mut self, id: &str) {
        if self.chats.remove(id).is_some() {
            self.persist();
        }
    }

    // ========================
    // Queries
    // ========================

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn proxy(&self, id: &str) -> Option<&Proxy> {
        self.proxies.get(id)
    }

    pub fn chat(&self, id: &str) -> Option<&Chat> {
        self.chats.get(id)
    }

    /// Accounts in a stable display order (by name, then id)
    pub fn accounts_sorted(&self) -> Vec<&Account> {
        let mut list: Vec<&Account> = self.accounts.values().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list
    }

    /// Proxies in a stable display order (by name, then id)
    pub fn proxies_sorted(&self) -> Vec<&Proxy> {
        let mut list: Vec<&Proxy> = self.proxies.values().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list
    }

    /// Chats in a stable display order (by name, then id)
    pub fn chats_sorted(&self) -> Vec<&Chat> {
        let mut list: Vec<&Chat> = self.chats.values().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list
    }

    // ========================
    // Import / export
    // ========================

    /// Serialize the full snapshot as pretty-printed JSON
    pub fn export_snapshot(&self) -> Result<String> {
        let snapshot = Snapshot {
            accounts: Some(self.accounts.clone()),
            proxies: Some(self.proxies.clone()),
            chats: Some(self.chats.clone()),
            schedules: HashMap::new(),
        };
        serde_json::to_string_pretty(&snapshot).context("serializing state snapshot")
    }

    /// Parse `text` as a snapshot and merge it in. Accepted only when at
    /// least one of the recognized collections (`accounts`, `proxies`,
    /// `chats`) is present; otherwise nothing is mutated.
    pub fn import_snapshot(&mut self, text: &str) -> Result<()> {
        let snapshot: Snapshot =
            serde_json::from_str(text).context("parsing configuration JSON")?;
        if !snapshot.has_known_collection() {
            bail!("no recognized collections in configuration");
        }
        self.apply(snapshot);
        self.persist();
        tracing::info!("Imported configuration snapshot");
        Ok(())
    }

    /// Generate an opaque random id unused in every collection
    fn fresh_id(&self) -> String {
        loop {
            let id: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(ID_LEN)
                .map(char::from)
                .collect();
            if !self.accounts.contains_key(&id)
                && !self.proxies.contains_key(&id)
                && !self.chats.contains_key(&id)
            {
                return id;
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostTime, ProxyType};
    use tempfile::TempDir;

    fn test_store() -> (Store, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Store::with_dir(dir.path());
        (store, dir)
    }

    fn sample_account() -> Account {
        Account {
            id: String::new(),
            name: "Main".into(),
            api_id: "12345".into(),
            api_hash: "abcdef".into(),
            phone_number: "+100200300".into(),
            session_file: "main.session".into(),
            proxy: None,
        }
    }

    fn sample_proxy() -> Proxy {
        Proxy {
            id: String::new(),
            name: "Local SOCKS".into(),
            kind: ProxyType::Socks5,
            host: "127.0.0.1".into(),
            port: "1080".into(),
            username: String::new(),
            password: String::new(),
        }
    }

    fn sample_chat(account_id: Option<String>) -> Chat {
        Chat {
            id: String::new(),
            name: "News".into(),
            chat_id: "-100123456".into(),
            message: "hello".into(),
            send_photo: false,
            photo_url: String::new(),
            account_id,
            times: vec![PostTime { hour: 9, minute: 0 }],
        }
    }

    #[test]
    fn test_upsert_round_trips() {
        let (mut store, _dir) = test_store();

        let account_id = store.upsert_account(sample_account());
        let proxy_id = store.upsert_proxy(sample_proxy());
        let chat_id = store.upsert_chat(sample_chat(Some(account_id.clone())));

        assert_eq!(store.account(&account_id).unwrap().name, "Main");
        assert_eq!(store.proxy(&proxy_id).unwrap().host, "127.0.0.1");
        let chat = store.chat(&chat_id).unwrap();
        assert_eq!(chat.account_id.as_deref(), Some(account_id.as_str()));
        assert_eq!(chat.times, vec![PostTime { hour: 9, minute: 0 }]);
    }

    #[test]
    fn test_upsert_with_existing_id_overwrites() {
        let (mut store, _dir) = test_store();

        let id = store.upsert_account(sample_account());
        let mut updated = store.account(&id).unwrap().clone();
        updated.name = "Renamed".into();
        let id2 = store.upsert_account(updated);

        assert_eq!(id, id2);
        assert_eq!(store.accounts.len(), 1);
        assert_eq!(store.account(&id).unwrap().name, "Renamed");
    }

    #[test]
    fn test_generated_ids_are_opaque_and_distinct() {
        let (mut store, _dir) = test_store();
        let a = store.upsert_account(sample_account());
        let b = store.upsert_account(sample_account());
        assert_ne!(a, b);
        assert_eq!(a.len(), crate::constants::ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_delete_account_clears_chat_reference() {
        let (mut store, _dir) = test_store();
        let account_id = store.upsert_account(sample_account());
        let chat_id = store.upsert_chat(sample_chat(Some(account_id.clone())));

        store.delete_account(&account_id);

        assert!(store.account(&account_id).is_none());
        let chat = store.chat(&chat_id).expect("chat must survive");
        assert!(chat.account_id.is_none());
    }

    #[test]
    fn test_delete_proxy_clears_account_reference() {
        let (mut store, _dir) = test_store();
        let proxy_id = store.upsert_proxy(sample_proxy());
        let mut account = sample_account();
        account.proxy = Some(proxy_id.clone());
        let account_id = store.upsert_account(account);

        store.delete_proxy(&proxy_id);

        assert!(store.proxy(&proxy_id).is_none());
        let account = store.account(&account_id).expect("account must survive");
        assert!(account.proxy.is_none());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (mut store, _dir) = test_store();
        let account_id = store.upsert_account(sample_account());
        store.delete_account("missing");
        store.delete_proxy("missing");
        store.delete_chat("missing");
        assert!(store.account(&account_id).is_some());
    }

    #[test]
    fn test_import_rejects_unrecognized_shape() {
        let (mut store, _dir) = test_store();
        store.upsert_account(sample_account());

        assert!(store.import_snapshot("{}").is_err());
        assert!(store.import_snapshot("not json at all").is_err());
        assert!(store.import_snapshot(r#"{"schedules":{}}"#).is_err());
        assert_eq!(store.accounts.len(), 1, "failed import must not mutate");
    }

    #[test]
    fn test_import_accepts_single_empty_collection() {
        let (mut store, _dir) = test_store();
        store.upsert_account(sample_account());
        let proxy_id = store.upsert_proxy(sample_proxy());

        store.import_snapshot(r#"{"accounts":{}}"#).unwrap();

        assert!(store.accounts.is_empty());
        // Collections absent from the import are left alone
        assert!(store.proxy(&proxy_id).is_some());
    }

    #[test]
    fn test_export_import_round_trip() {
        let (mut store, _dir) = test_store();
        let proxy_id = store.upsert_proxy(sample_proxy());
        let mut account = sample_account();
        account.proxy = Some(proxy_id);
        let account_id = store.upsert_account(account);
        store.upsert_chat(sample_chat(Some(account_id)));

        let exported = store.export_snapshot().unwrap();

        let (mut other, _dir2) = test_store();
        other.import_snapshot(&exported).unwrap();
        assert_eq!(other.accounts, store.accounts);
        assert_eq!(other.proxies, store.proxies);
        assert_eq!(other.chats, store.chats);
    }

    #[test]
    fn test_export_carries_reserved_schedules_key() {
        let (store, _dir) = test_store();
        let exported = store.export_snapshot().unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert!(value["schedules"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_mutations_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let account_id = {
            let mut store = Store::with_dir(dir.path());
            let account_id = store.upsert_account(sample_account());
            store.upsert_chat(sample_chat(Some(account_id.clone())));
            account_id
        };

        let reopened = Store::with_dir(dir.path());
        assert_eq!(reopened.account(&account_id).unwrap().name, "Main");
        assert_eq!(reopened.chats.len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), "{{{ definitely not json").unwrap();

        let store = Store::with_dir(dir.path());
        assert!(store.accounts.is_empty());
        assert!(store.proxies.is_empty());
        assert!(store.chats.is_empty());
    }

    #[test]
    fn test_snapshot_ignores_unknown_keys() {
        let (mut store, _dir) = test_store();
        store
            .import_snapshot(r#"{"accounts":{},"futureFeature":42}"#)
            .unwrap();
        assert!(store.accounts.is_empty());
    }
}
