use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::bucket::{BucketKey, MENU_ORDER};
use crate::engine::classifier::{Classification, RowTable};
use crate::engine::skill::{IndexedSkill, SkillId};
use crate::engine::target::{JumpTarget, resolve_indexed};
use crate::store::context_store::PersistedContext;
use crate::store::kv_store::KeyValueStore;

// --- Menu Entries ---

/// Which crown artwork an entry gets. Purely presentational.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrownVariant {
    Earned,
    NotYetEarned,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub bucket: BucketKey,
    pub label: String,
    pub target: JumpTarget,
    pub variant: CrownVariant,
    /// The bucket head the target was computed from.
    pub skill: SkillId,
}

fn entry_label(bucket: BucketKey, head: &IndexedSkill) -> String {
    match bucket {
        BucketKey::Level(0) | BucketKey::FinalLevel | BucketKey::Decayed | BucketKey::Crown => {
            String::new()
        }
        BucketKey::Level(n) => n.to_string(),
        BucketKey::LastLevel => head
            .id
            .position()
            .map(|p| p.to_string())
            .unwrap_or_default(),
    }
}

fn entry_variant(bucket: BucketKey) -> CrownVariant {
    match bucket {
        BucketKey::Level(0) | BucketKey::Decayed => CrownVariant::NotYetEarned,
        _ => CrownVariant::Earned,
    }
}

fn make_entry(bucket: BucketKey, head: &IndexedSkill, rows: &RowTable) -> MenuEntry {
    MenuEntry {
        bucket,
        label: entry_label(bucket, head),
        target: resolve_indexed(head, rows),
        variant: entry_variant(bucket),
        skill: head.id.clone(),
    }
}

/// One entry per non-empty bucket, in [`MENU_ORDER`], each pointing at its bucket head.
pub fn build_surface(classification: &Classification) -> Vec<MenuEntry> {
    MENU_ORDER
        .iter()
        .filter_map(|&bucket| {
            classification
                .head(bucket)
                .map(|head| make_entry(bucket, head, &classification.rows))
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JumpMenu {
    pub entries: Vec<MenuEntry>,
}

impl JumpMenu {
    pub fn build(classification: &Classification) -> Self {
        let entries = build_surface(classification);
        debug!(entries = entries.len(), "built jump menu");
        Self { entries }
    }

    pub fn entry(&self, bucket: BucketKey) -> Option<&MenuEntry> {
        self.entries.iter().find(|e| e.bucket == bucket)
    }

    pub fn position_of(&self, bucket: BucketKey) -> Option<usize> {
        self.entries.iter().position(|e| e.bucket == bucket)
    }

    /// Retarget the existing `lastLevel` entry in place. Returns `false`
    /// when the menu has no such entry; nothing is added in that case.
    pub fn update_last_level(&mut self, skill: &IndexedSkill, rows: &RowTable) -> bool {
        match self.entries.iter_mut().find(|e| e.bucket == BucketKey::LastLevel) {
            Some(entry) => {
                *entry = make_entry(BucketKey::LastLevel, skill, rows);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// --- Click Wiring ---

/// What a skill click changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activation {
    pub skill: SkillId,
    pub persisted: bool,
    pub menu_updated: bool,
}

/// Handler bound to one skill element. Holds the skill's index position,
/// never a reference into the classification it was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillHandler {
    position: usize,
}

impl SkillHandler {
    pub fn fire(
        self,
        classification: &mut Classification,
        persisted: &mut PersistedContext,
        menu: Option<&mut JumpMenu>,
        store: &mut dyn KeyValueStore,
    ) -> Option<Activation> {
        let skill = classification.skills.get(self.position)?.clone();
        classification.set_last_level(skill.clone());
        let stored = persisted.record_last_level(store, &skill.id);
        let menu_updated =
            menu.is_some_and(|m| m.update_last_level(&skill, &classification.rows));
        debug!(id = %skill.id, stored, menu_updated, "skill opened");
        Some(Activation {
            skill: skill.id,
            persisted: stored,
            menu_updated,
        })
    }
}

/// Skill id -> click handler, built once per indexing pass for every input skill.
#[derive(Clone, Debug, Default)]
pub struct ClickRegistry {
    handlers: BTreeMap<SkillId, SkillHandler>,
}

impl ClickRegistry {
    pub fn register(classification: &Classification) -> Self {
        let handlers = classification
            .skills
            .iter()
            .enumerate()
            .map(|(position, s)| (s.id.clone(), SkillHandler { position }))
            .collect();
        Self { handlers }
    }

    pub fn handler(&self, id: &SkillId) -> Option<SkillHandler> {
        self.handlers.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
