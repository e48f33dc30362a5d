use tracing::{debug, info};

use crate::engine::bucket::BucketKey;
use crate::engine::classifier::{Classification, ClassifyOptions, classify};
use crate::engine::skill::{SkillId, StateSnapshot};
use crate::engine::target::JumpTarget;
use crate::session::surface::{Activation, ClickRegistry, JumpMenu};
use crate::store::context_store::PersistedContext;
use crate::store::kv_store::KeyValueStore;

/// Everything one tree-view activation knows. Built fresh on each
/// `Unindexed -> Indexed` transition and dropped when the view is left.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub persisted: PersistedContext,
    pub classification: Classification,
    pub menu: Option<JumpMenu>,
    registry: ClickRegistry,
}

impl SessionContext {
    /// Load persisted context, classify and wire click handlers. The menu is
    /// built separately by [`SessionContext::render_menu`].
    pub fn index(
        snapshot: &StateSnapshot,
        store: &dyn KeyValueStore,
        options: &ClassifyOptions,
    ) -> Self {
        let persisted = PersistedContext::load(store, &snapshot.language);
        debug!(
            language = %snapshot.language.key_suffix(),
            last_level = %persisted.last_level,
            "loaded persisted context"
        );
        let classification = classify(&snapshot.skills, &persisted.last_level, options);
        let registry = ClickRegistry::register(&classification);
        Self {
            persisted,
            classification,
            menu: None,
            registry,
        }
    }

    pub fn render_menu(&mut self) -> &JumpMenu {
        self.menu.insert(JumpMenu::build(&self.classification))
    }

    /// Run the click handler registered for `id`. Unknown ids are ignored.
    pub fn activate(&mut self, id: &SkillId, store: &mut dyn KeyValueStore) -> Option<Activation> {
        let handler = self.registry.handler(id)?;
        handler.fire(
            &mut self.classification,
            &mut self.persisted,
            self.menu.as_mut(),
            store,
        )
    }

    pub fn registry(&self) -> &ClickRegistry {
        &self.registry
    }

    /// Target of the menu entry named by the persisted auto-scroll setting.
    pub fn auto_scroll_target(&self) -> Option<JumpTarget> {
        if !self.persisted.auto_scroll_enabled() {
            return None;
        }
        let bucket = BucketKey::from_key(&self.persisted.auto_scroll)?;
        let target = self.menu.as_ref()?.entry(bucket)?.target.clone();
        info!(bucket = %bucket, target = %target, "auto-scrolling");
        Some(target)
    }

    /// Bucket whose menu entry should start out selected.
    pub fn auto_jump_bucket(&self) -> Option<BucketKey> {
        BucketKey::from_key(&self.persisted.auto_jump)
    }
}
