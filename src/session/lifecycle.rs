use tracing::{debug, info};

use crate::engine::classifier::ClassifyOptions;
use crate::engine::skill::{SkillId, StateSnapshot};
use crate::engine::target::JumpTarget;
use crate::error::Result;
use crate::session::context::SessionContext;
use crate::session::surface::Activation;
use crate::store::kv_store::KeyValueStore;

pub const DEFAULT_TREE_PATH_MARKER: &str = "/learn";

/// What the controller needs to see of the host page.
pub trait HostPage {
    fn location_path(&self) -> &str;
    /// Whether the tree view has rendered its skill elements yet.
    fn has_skill_elements(&self) -> bool;
    fn read_snapshot(&self) -> Result<StateSnapshot>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Unindexed,
    Indexed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    /// Classification and menu were (re)built.
    Indexed,
    /// The tree view was left; the session was dropped.
    Reset,
}

#[derive(Debug)]
pub struct LifecycleController {
    state: LifecycleState,
    tree_path_marker: String,
    options: ClassifyOptions,
    session: Option<SessionContext>,
}

impl LifecycleController {
    pub fn new(tree_path_marker: impl Into<String>, options: ClassifyOptions) -> Self {
        Self {
            state: LifecycleState::Unindexed,
            tree_path_marker: tree_path_marker.into(),
            options,
            session: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn is_tree_view(&self, path: &str) -> bool {
        path.contains(&self.tree_path_marker)
    }

    /// Entry point for page-structure change notifications. Safe to call on
    /// every notification: at most one indexing pass runs per activation.
    ///
    /// The state flips to `Indexed` before the snapshot is read, so a broken
    /// snapshot is reported once and not retried until the view is re-entered.
    pub fn on_page_changed(
        &mut self,
        page: &dyn HostPage,
        store: &dyn KeyValueStore,
    ) -> Result<Transition> {
        if !self.is_tree_view(page.location_path()) {
            if self.state == LifecycleState::Indexed {
                debug!(path = page.location_path(), "left tree view, resetting");
                self.state = LifecycleState::Unindexed;
                self.session = None;
                return Ok(Transition::Reset);
            }
            return Ok(Transition::Unchanged);
        }

        if self.state == LifecycleState::Indexed || !page.has_skill_elements() {
            return Ok(Transition::Unchanged);
        }

        self.state = LifecycleState::Indexed;
        let snapshot = page.read_snapshot()?;
        let mut session = SessionContext::index(&snapshot, store, &self.options);
        let entries = session.render_menu().len();
        info!(
            skills = snapshot.skills.len(),
            entries, "indexed tree view"
        );
        self.session = Some(session);
        Ok(Transition::Indexed)
    }

    /// Entry point for the one-shot page-load signal.
    pub fn on_page_loaded(&self) -> Option<JumpTarget> {
        self.session.as_ref()?.auto_scroll_target()
    }

    /// Click on a skill element. Ignored outside an indexed session.
    pub fn on_skill_activated(
        &mut self,
        id: &SkillId,
        store: &mut dyn KeyValueStore,
    ) -> Option<Activation> {
        self.session.as_mut()?.activate(id, store)
    }
}
