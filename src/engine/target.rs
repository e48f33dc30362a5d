use std::fmt;

use crate::engine::classifier::RowTable;
use crate::engine::skill::{IndexedSkill, SkillId, SkillRecord};

/// Where a jump lands. The host dispatches a different navigation action for each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JumpTarget {
    /// Scroll the element with this id to the top of the view.
    Anchor(SkillId),
    /// Nothing precedes the skill; scroll the whole view to the top.
    ScrollToTop,
}

/// Renders the target the way a page link would carry it.
impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpTarget::Anchor(id) => write!(f, "#{id}"),
            JumpTarget::ScrollToTop => f.write_str("top"),
        }
    }
}

/// Jumping to a skill means anchoring on the row just above it, so the skill
/// itself is visible with its predecessor as context. Accessibility of that
/// predecessor is irrelevant.
pub fn resolve_target(skill: &SkillRecord, rows: &RowTable) -> JumpTarget {
    skill
        .row
        .checked_sub(1)
        .and_then(|prev| rows.get(&prev))
        .map_or(JumpTarget::ScrollToTop, |id| JumpTarget::Anchor(id.clone()))
}

pub fn resolve_indexed(skill: &IndexedSkill, rows: &RowTable) -> JumpTarget {
    resolve_target(&skill.record, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classifier::{ClassifyOptions, classify};

    fn skill(row: i64, finished: i64, accessible: bool) -> SkillRecord {
        SkillRecord {
            row,
            finished_levels: finished,
            levels: 5,
            accessible,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_tree_targets() {
        let skills = vec![skill(0, 2, true), skill(1, 5, true), skill(2, 4, true)];
        let c = classify(&skills, &SkillId::from_raw(""), &ClassifyOptions::default());

        assert_eq!(
            resolve_target(&skills[2], &c.rows),
            JumpTarget::Anchor(SkillId::from_raw("LevelJumper_1"))
        );
        assert_eq!(resolve_target(&skills[0], &c.rows), JumpTarget::ScrollToTop);
    }

    #[test]
    fn test_inaccessible_predecessor_still_resolves() {
        let skills = vec![skill(0, 0, false), skill(1, 0, true)];
        let c = classify(&skills, &SkillId::from_raw(""), &ClassifyOptions::default());
        assert_eq!(
            resolve_target(&skills[1], &c.rows),
            JumpTarget::Anchor(SkillId::from_raw("LevelJumper_0"))
        );
    }

    #[test]
    fn test_gap_in_rows_scrolls_to_top() {
        let skills = vec![skill(0, 0, true), skill(4, 0, true)];
        let c = classify(&skills, &SkillId::from_raw(""), &ClassifyOptions::default());
        assert_eq!(resolve_target(&skills[1], &c.rows), JumpTarget::ScrollToTop);
    }

    #[test]
    fn test_minimum_row_never_underflows() {
        let rows = RowTable::new();
        assert_eq!(resolve_target(&skill(i64::MIN, 0, true), &rows), JumpTarget::ScrollToTop);
    }

    #[test]
    fn test_display_matches_link_form() {
        let anchor = JumpTarget::Anchor(SkillId::from_raw("LevelJumper_4"));
        assert_eq!(anchor.to_string(), "#LevelJumper_4");
        assert_eq!(JumpTarget::ScrollToTop.to_string(), "top");
    }
}
