//! Tool description overrides.
//!
//! Descriptions can be overridden per key through `GITHUB_MCP_<KEY>`
//! environment variables or a `github-mcp-gateway-config.json` file in
//! the working directory. Every key looked up is recorded with its
//! effective value so `--export-translations` can dump the full set as
//! a starting point for customization.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::{AppError, Result};

/// Looks up the effective description for a key, given its default.
pub type Translator = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Writes the collected key set to the override file.
pub type TranslationDump = Box<dyn Fn() -> Result<()> + Send>;

const OVERRIDE_FILE: &str = "github-mcp-gateway-config.json";
const ENV_PREFIX: &str = "GITHUB_MCP_";

fn load_override_file(path: &Path) -> BTreeMap<String, String> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(err) => {
            warn!(%err, file = %path.display(), "ignoring unparseable translation override file");
            BTreeMap::new()
        }
    }
}

/// Build a translator and its export companion.
///
/// Lookup order per key: environment variable, override file, default.
/// The translator is cheap to clone and safe to share across sessions.
#[must_use]
pub fn translation_helper() -> (Translator, TranslationDump) {
    let file_overrides = load_override_file(Path::new(OVERRIDE_FILE));
    let seen: Arc<Mutex<BTreeMap<String, String>>> = Arc::new(Mutex::new(BTreeMap::new()));

    let seen_for_lookup = Arc::clone(&seen);
    let translator: Translator = Arc::new(move |key: &str, default: &str| {
        let value = env::var(format!("{ENV_PREFIX}{key}"))
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| file_overrides.get(key).cloned())
            .unwrap_or_else(|| default.to_owned());

        seen_for_lookup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.clone());

        value
    });

    let dump: TranslationDump = Box::new(move || {
        let snapshot = seen.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let rendered = serde_json::to_string_pretty(&snapshot)
            .map_err(|err| AppError::Config(format!("failed to render translations: {err}")))?;
        std::fs::write(OVERRIDE_FILE, rendered)
            .map_err(|err| AppError::Io(format!("failed to write {OVERRIDE_FILE}: {err}")))?;
        Ok(())
    });

    (translator, dump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn default_is_returned_without_override() {
        let (translator, _dump) = translation_helper();
        assert_eq!(
            translator("TOOL_GET_ME_DESCRIPTION", "Get my user"),
            "Get my user"
        );
    }

    #[test]
    #[serial]
    fn environment_override_wins() {
        env::set_var("GITHUB_MCP_TOOL_GET_ME_DESCRIPTION", "Custom text");
        let (translator, _dump) = translation_helper();
        assert_eq!(
            translator("TOOL_GET_ME_DESCRIPTION", "Get my user"),
            "Custom text"
        );
        env::remove_var("GITHUB_MCP_TOOL_GET_ME_DESCRIPTION");
    }

    #[test]
    #[serial]
    fn empty_environment_override_is_ignored() {
        env::set_var("GITHUB_MCP_TOOL_GET_ME_DESCRIPTION", "");
        let (translator, _dump) = translation_helper();
        assert_eq!(
            translator("TOOL_GET_ME_DESCRIPTION", "Get my user"),
            "Get my user"
        );
        env::remove_var("GITHUB_MCP_TOOL_GET_ME_DESCRIPTION");
    }
}
