use serde::{Deserialize, Serialize};

/// One `[[accounts]]` entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccountConfig {
    /// Account locator substituted into the scripts.
    #[serde(default)]
    pub account: String,

    /// Human-friendly label shown next to the account.
    #[serde(default)]
    pub nickname: String,

    /// SQL client invocation used to execute statements against this account.
    /// Statements are written to the command's stdin one at a time.
    #[serde(default)]
    pub session_command: Vec<String>,

    /// Statement that makes the client print the sync marker after each
    /// statement. Blank uses the built-in `select`.
    #[serde(default)]
    pub sync_statement: String,
}

impl AccountConfig {
    pub fn display_name(&self) -> String {
        format!(
            "{} - {}",
            self.nickname.to_uppercase(),
            self.account.to_uppercase()
        )
    }

    fn matches(&self, needle: &str) -> bool {
        self.account.eq_ignore_ascii_case(needle)
            || (!self.nickname.is_empty() && self.nickname.eq_ignore_ascii_case(needle))
    }
}

/// Accounts usable as provider or consumer, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<AccountConfig>,
}

impl AccountRegistry {
    /// Builds the registry, dropping entries without an account locator and
    /// normalizing locators to upper case.
    pub fn from_entries(entries: &[AccountConfig]) -> Self {
        let accounts = entries
            .iter()
            .filter(|entry| !entry.account.trim().is_empty())
            .map(|entry| AccountConfig {
                account: entry.account.trim().to_uppercase(),
                nickname: entry.nickname.trim().to_string(),
                session_command: entry.session_command.clone(),
                sync_statement: entry.sync_statement.trim().to_string(),
            })
            .collect();
        Self { accounts }
    }

    /// Finds an account by locator or nickname, ignoring case.
    pub fn find(&self, needle: &str) -> Option<&AccountConfig> {
        let needle = needle.trim();
        self.accounts.iter().find(|entry| entry.matches(needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountConfig> {
        self.accounts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}
