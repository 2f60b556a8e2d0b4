//! Account directory backed by a JSON file.
//!
//! The surrounding application owns accounts; this lets the CLI replay
//! failed deliveries against an exported snapshot of them.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use courier_core::{Account, AccountDirectory, CoreError, Recipient, ResetToken};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::load_json_or_default;

/// On-disk shape of the accounts file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsFile {
    /// Known accounts.
    pub accounts: Vec<AccountRecord>,
}

/// One account and the reset tokens issued to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account data.
    #[serde(flatten)]
    pub account: Account,
    /// Issued reset tokens, any order.
    #[serde(default)]
    pub reset_tokens: Vec<ResetToken>,
}

/// Read-only account lookup over an [`AccountsFile`].
#[derive(Debug, Default)]
pub struct JsonAccountDirectory {
    by_recipient: HashMap<String, AccountRecord>,
}

impl JsonAccountDirectory {
    /// Loads the accounts file; a missing file is an empty directory.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let file: AccountsFile = load_json_or_default(path).await?;
        debug!(path = %path.display(), accounts = file.accounts.len(), "Loaded accounts");
        Ok(Self::from_file(file))
    }

    /// Builds a directory from already-parsed records.
    pub fn from_file(file: AccountsFile) -> Self {
        let by_recipient = file
            .accounts
            .into_iter()
            .map(|r| (normalize(&r.account.recipient), r))
            .collect();
        Self { by_recipient }
    }

    /// Number of known accounts.
    pub fn len(&self) -> usize {
        self.by_recipient.len()
    }

    /// True when no accounts are known.
    pub fn is_empty(&self) -> bool {
        self.by_recipient.is_empty()
    }
}

#[async_trait]
impl AccountDirectory for JsonAccountDirectory {
    async fn find_account(&self, recipient: &Recipient) -> Result<Option<Account>, CoreError> {
        Ok(self
            .by_recipient
            .get(&normalize(recipient))
            .map(|r| r.account.clone()))
    }

    async fn latest_reset_token(&self, account: &Account) -> Result<Option<ResetToken>, CoreError> {
        Ok(self
            .by_recipient
            .get(&normalize(&account.recipient))
            .filter(|r| r.account.id == account.id)
            .and_then(|r| r.reset_tokens.iter().max_by_key(|t| t.issued_at))
            .cloned())
    }
}

// Mailbox lookups ignore case.
fn normalize(recipient: &Recipient) -> String {
    recipient.as_str().to_ascii_lowercase()
}
