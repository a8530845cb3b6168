//! Demo credential payloads.
//!
//! The backend answers either with a single account or with a list of
//! accounts; both are folded into one [`DemoCredentials`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoAccount {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Raw demo-credentials response accepting both shapes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoCredentialsResponse {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub anonymous_option: Option<String>,
    #[serde(default)]
    pub available_accounts: Vec<DemoAccount>,
}

/// Normalized demo credentials. `email`/`password` is the account to use for
/// a one-click demo login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoCredentials {
    pub email: String,
    pub password: String,
    pub note: String,
    pub anonymous_option: String,
    /// Every advertised account (a single-account payload yields one entry).
    pub accounts: Vec<DemoAccount>,
}

impl DemoCredentialsResponse {
    /// Folds either payload shape into [`DemoCredentials`].
    ///
    /// The account list wins when non-empty (its first entry becomes the
    /// default login); otherwise a single account needs both email and
    /// password to be usable.
    pub fn normalize(self) -> Option<DemoCredentials> {
        let note = self.note.unwrap_or_default();
        let anonymous_option = self.anonymous_option.unwrap_or_default();

        if let Some(first) = self.available_accounts.first() {
            return Some(DemoCredentials {
                email: first.email.clone(),
                password: first.password.clone(),
                note,
                anonymous_option,
                accounts: self.available_accounts,
            });
        }

        let email = self.email.filter(|e| !e.is_empty())?;
        let password = self.password.filter(|p| !p.is_empty())?;
        Some(DemoCredentials {
            accounts: vec![DemoAccount {
                role: String::new(),
                email: email.clone(),
                password: password.clone(),
            }],
            email,
            password,
            note,
            anonymous_option,
        })
    }
}
