//! Account models

use serde::{Deserialize, Serialize};

/// Minimal user or organization account as embedded in most responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleUser {
    /// Account login
    pub login: String,
}

impl SimpleUser {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}
