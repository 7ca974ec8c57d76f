//! Backend connection settings.
//!
//! The URL and API key come from the process environment (a `.env` file is
//! loaded by the binary before this runs). When a variable is unset the
//! documented placeholder is used, which makes client construction fail with
//! a clear message instead of silently talking to the wrong host.

use tracing::warn;

/// Environment variable holding the backend base URL
pub const URL_VAR: &str = "EXPO_PUBLIC_SUPABASE_URL";

/// Environment variable holding the backend API key
pub const KEY_VAR: &str = "EXPO_PUBLIC_SUPABASE_ANON_KEY";

pub const URL_PLACEHOLDER: &str = "YOUR_SUPABASE_URL";
pub const KEY_PLACEHOLDER: &str = "YOUR_SUPABASE_ANON_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through `lookup`, falling back to placeholders.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str, placeholder: &str| {
            lookup(name).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| {
                warn!(variable = name, "Not set, using placeholder");
                placeholder.to_string()
            })
        };

        Self {
            url: read(URL_VAR, URL_PLACEHOLDER),
            api_key: read(KEY_VAR, KEY_PLACEHOLDER),
        }
    }

    pub fn uses_placeholders(&self) -> bool {
        self.url == URL_PLACEHOLDER || self.api_key == KEY_PLACEHOLDER
    }
}
