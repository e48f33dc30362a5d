use tracing::{debug, warn};

use crate::engine::skill::{LanguagePair, SkillId};
use crate::store::kv_store::KeyValueStore;

pub const FEATURE: &str = "LevelJumper";

pub const DEFAULT_AUTO_JUMP: &str = "0";
pub const AUTO_SCROLL_OFF: &str = "off";
/// Matches no synthetic id, so it stands for "nothing opened yet".
pub const NO_LAST_LEVEL: &str = "";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextField {
    AutoJump,
    AutoScroll,
    LastLevel,
}

impl ContextField {
    pub fn to_key(self) -> &'static str {
        match self {
            ContextField::AutoJump => "autoJump",
            ContextField::AutoScroll => "autoScroll",
            ContextField::LastLevel => "lastLevel",
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            ContextField::AutoJump => DEFAULT_AUTO_JUMP,
            ContextField::AutoScroll => AUTO_SCROLL_OFF,
            ContextField::LastLevel => NO_LAST_LEVEL,
        }
    }
}

/// `<feature>-<field>-<learningLang>_<sourceLang>`
pub fn store_key(field: ContextField, language: &LanguagePair) -> String {
    format!("{FEATURE}-{}-{}", field.to_key(), language.key_suffix())
}

/// Read a field, substituting its default when absent or unreadable.
pub fn read_field(store: &dyn KeyValueStore, field: ContextField, language: &LanguagePair) -> String {
    let key = store_key(field, language);
    match store.get(&key) {
        Ok(Some(value)) => value,
        Ok(None) => field.default_value().to_string(),
        Err(e) => {
            warn!(key = %key, error = %e, "store read failed, using default");
            field.default_value().to_string()
        }
    }
}

/// Write a field. Failures are logged and swallowed; returns whether the write landed.
pub fn write_field(
    store: &mut dyn KeyValueStore,
    field: ContextField,
    language: &LanguagePair,
    value: &str,
) -> bool {
    let key = store_key(field, language);
    match store.set(&key, value) {
        Ok(()) => {
            debug!(key = %key, value, "stored");
            true
        }
        Err(e) => {
            warn!(key = %key, error = %e, "store write failed, keeping in-memory value only");
            false
        }
    }
}

/// Durable per-language-pair state, read once per tree-view activation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedContext {
    pub language: LanguagePair,
    /// Bucket key of the menu entry to preselect.
    pub auto_jump: String,
    /// Bucket key to jump to on page load, or `"off"`.
    pub auto_scroll: String,
    pub last_level: SkillId,
}

impl PersistedContext {
    pub fn load(store: &dyn KeyValueStore, language: &LanguagePair) -> Self {
        Self {
            language: language.clone(),
            auto_jump: read_field(store, ContextField::AutoJump, language),
            auto_scroll: read_field(store, ContextField::AutoScroll, language),
            last_level: SkillId::from_raw(read_field(store, ContextField::LastLevel, language)),
        }
    }

    /// Update the last-opened skill in memory and write it through immediately.
    pub fn record_last_level(&mut self, store: &mut dyn KeyValueStore, id: &SkillId) -> bool {
        self.last_level = id.clone();
        write_field(store, ContextField::LastLevel, &self.language, id.as_str())
    }

    pub fn auto_scroll_enabled(&self) -> bool {
        self.auto_scroll != AUTO_SCROLL_OFF
    }
}
