use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rust_embed::Embed;
use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::engine::skill::{SkillId, SkillRecord, StateSnapshot};
use crate::engine::target::JumpTarget;
use crate::session::lifecycle::{HostPage, LifecycleController, Transition};
use crate::session::surface::MenuEntry;
use crate::store::kv_store::KeyValueStore;
use crate::ui::theme::Theme;

#[derive(Embed)]
#[folder = "assets/states/"]
struct StateAssets;

const SAMPLE_STATE: &str = "sample.json";

// --- State Source ---

/// The host's raw progress document, as the page would hold it.
pub struct StateSource {
    pub origin: String,
    pub json: String,
}

impl StateSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading state file {}", path.display()))?;
        Ok(Self {
            origin: path.display().to_string(),
            json,
        })
    }

    pub fn bundled() -> Result<Self> {
        let file = StateAssets::get(SAMPLE_STATE)
            .ok_or_else(|| anyhow!("bundled {SAMPLE_STATE} missing"))?;
        let json = String::from_utf8(file.data.into_owned())?;
        Ok(Self {
            origin: format!("bundled {SAMPLE_STATE}"),
            json,
        })
    }

    pub fn snapshot(&self) -> crate::error::Result<StateSnapshot> {
        StateSnapshot::from_json(&self.json)
    }
}

/// Skills as the tree view draws them. Independent of indexing: a document
/// missing its `user` block still renders, it just never gets a menu.
fn rendered_skills(json: &str) -> Vec<SkillRecord> {
    let Ok(doc) = serde_json::from_str::<Value>(json) else {
        return Vec::new();
    };
    let items: Vec<Value> = match doc.get("skills") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => map.values().cloned().collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|v| SkillRecord::from_value(v).unwrap_or_default())
        .collect()
}

// --- Screens ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Learn,
    Profile,
}

impl AppScreen {
    pub fn path(self) -> &'static str {
        match self {
            AppScreen::Learn => "/learn",
            AppScreen::Profile => "/profile",
        }
    }

    fn toggled(self) -> Self {
        match self {
            AppScreen::Learn => AppScreen::Profile,
            AppScreen::Profile => AppScreen::Learn,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Menu,
}

pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

struct TerminalPage<'a> {
    path: &'static str,
    source: &'a StateSource,
    rendered: bool,
}

impl HostPage for TerminalPage<'_> {
    fn location_path(&self) -> &str {
        self.path
    }

    fn has_skill_elements(&self) -> bool {
        self.rendered
    }

    fn read_snapshot(&self) -> crate::error::Result<StateSnapshot> {
        self.source.snapshot()
    }
}

// --- App ---

pub struct App {
    pub screen: AppScreen,
    pub focus: Focus,
    pub config: Config,
    pub theme: Theme,
    pub source: StateSource,
    pub skills: Vec<SkillRecord>,
    pub lifecycle: LifecycleController,
    store: Box<dyn KeyValueStore>,
    /// First visible tree line.
    pub scroll: usize,
    pub skill_selected: usize,
    pub menu_selected: usize,
    pub status: Option<StatusLine>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, source: StateSource, store: Box<dyn KeyValueStore>) -> Self {
        let theme = Theme::load(&config.theme).unwrap_or_default();
        let skills = rendered_skills(&source.json);
        let lifecycle =
            LifecycleController::new(config.tree_path_marker.clone(), config.classify_options());
        Self {
            screen: AppScreen::Learn,
            focus: Focus::Tree,
            config,
            theme,
            source,
            skills,
            lifecycle,
            store,
            scroll: 0,
            skill_selected: 0,
            menu_selected: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Tree lines: skills grouped by row, rows ascending, input order within a row.
    pub fn tree_rows(&self) -> Vec<(i64, Vec<usize>)> {
        let mut rows: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (pos, skill) in self.skills.iter().enumerate() {
            rows.entry(skill.row).or_default().push(pos);
        }
        rows.into_iter().collect()
    }

    pub fn line_of_skill(&self, position: usize) -> Option<usize> {
        self.tree_rows()
            .iter()
            .position(|(_, members)| members.contains(&position))
    }

    pub fn menu_entries(&self) -> &[MenuEntry] {
        self.lifecycle
            .session()
            .and_then(|s| s.menu.as_ref())
            .map(|m| m.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn last_opened(&self) -> Option<usize> {
        self.lifecycle
            .session()?
            .classification
            .last_level()?
            .id
            .position()
    }

    fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error,
        });
    }

    /// Page-structure change notification. Called after every event.
    pub fn notify_page_changed(&mut self) {
        let page = TerminalPage {
            path: self.screen.path(),
            source: &self.source,
            rendered: self.screen == AppScreen::Learn && !self.skills.is_empty(),
        };
        match self.lifecycle.on_page_changed(&page, self.store.as_ref()) {
            Ok(Transition::Indexed) => {
                let session = self.lifecycle.session();
                self.menu_selected = session
                    .and_then(|s| Some((s.auto_jump_bucket()?, s.menu.as_ref()?)))
                    .and_then(|(bucket, menu)| menu.position_of(bucket))
                    .unwrap_or(0);
                let anomalies = session.map_or(0, |s| s.classification.anomalies.len());
                if anomalies > 0 {
                    self.set_status(format!("{anomalies} skill(s) with unexpected progress skipped"), false);
                }
            }
            Ok(Transition::Reset) => {
                self.menu_selected = 0;
                self.scroll = 0;
            }
            Ok(Transition::Unchanged) => {}
            Err(e) => {
                error!(error = %e, origin = %self.source.origin, "indexing failed");
                self.set_status(format!("Cannot index tree: {e}"), true);
            }
        }
    }

    /// One-shot page-load signal.
    pub fn page_loaded(&mut self) {
        if let Some(target) = self.lifecycle.on_page_loaded() {
            self.navigate(&target);
            self.set_status(format!("Auto-scrolled to {target}"), false);
        }
    }

    pub fn navigate(&mut self, target: &JumpTarget) {
        match target {
            JumpTarget::ScrollToTop => self.scroll = 0,
            JumpTarget::Anchor(id) => {
                if let Some(line) = id.position().and_then(|p| self.line_of_skill(p)) {
                    self.scroll = line;
                }
            }
        }
    }

    pub fn jump_to_selected_entry(&mut self) {
        let Some(entry) = self.menu_entries().get(self.menu_selected).cloned() else {
            return;
        };
        info!(bucket = %entry.bucket, target = %entry.target, "jump");
        self.navigate(&entry.target);
        if let Some(pos) = entry.skill.position() {
            self.skill_selected = pos;
        }
    }

    pub fn open_selected_skill(&mut self) {
        let id = SkillId::new(&self.config.id_prefix, self.skill_selected);
        match self.lifecycle.on_skill_activated(&id, self.store.as_mut()) {
            Some(a) if a.persisted => {
                self.set_status(format!("Opened {}", self.skill_name(self.skill_selected)), false);
            }
            Some(_) => self.set_status("Opened skill, but it could not be remembered", true),
            None => self.set_status("Tree is not indexed yet", true),
        }
    }

    pub fn skill_name(&self, position: usize) -> String {
        self.skills
            .get(position)
            .map(SkillRecord::display_name)
            .unwrap_or_default()
    }

    pub fn toggle_screen(&mut self) {
        self.screen = self.screen.toggled();
        self.notify_page_changed();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree if !self.menu_entries().is_empty() => Focus::Menu,
            _ => Focus::Tree,
        };
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Focus::Tree => {
                if self.skill_selected + 1 < self.skills.len() {
                    self.skill_selected += 1;
                }
            }
            Focus::Menu => {
                let len = self.menu_entries().len();
                if len > 0 {
                    self.menu_selected = (self.menu_selected + 1) % len;
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Focus::Tree => self.skill_selected = self.skill_selected.saturating_sub(1),
            Focus::Menu => {
                let len = self.menu_entries().len();
                if len > 0 {
                    self.menu_selected = (self.menu_selected + len - 1) % len;
                }
            }
        }
    }

    pub fn activate(&mut self) {
        match self.focus {
            Focus::Tree => self.open_selected_skill(),
            Focus::Menu => self.jump_to_selected_entry(),
        }
    }

    /// Keep the tree cursor inside a viewport of `height` lines.
    pub fn clamp_scroll(&mut self, height: usize) {
        let Some(line) = self.line_of_skill(self.skill_selected) else {
            return;
        };
        if line < self.scroll {
            self.scroll = line;
        } else if height > 0 && line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }
}
