use serde::{Deserialize, Serialize};

/// Account conveniences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Email used by `signin` when none is given; updated on each sign-in.
    #[serde(default)]
    pub remember_email: Option<String>,
}
