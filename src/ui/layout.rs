use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the jump menu column when it sits beside the tree.
const MENU_WIDTH: u16 = 38;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥90 cols: tree + menu side by side
    Narrow, // <90 cols: menu stacked under the tree
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 90 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub tree: Rect,
    pub menu: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect, menu_entries: usize) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(2),
            ])
            .split(area);

        let (tree, menu) = match tier {
            LayoutTier::Wide => {
                let horizontal = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(20), Constraint::Length(MENU_WIDTH)])
                    .split(vertical[1]);
                (horizontal[0], horizontal[1])
            }
            LayoutTier::Narrow => {
                // borders + one line per entry, at least room for the empty-state line
                let menu_height = (menu_entries.max(1) as u16).saturating_add(2);
                let stacked = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(3), Constraint::Length(menu_height)])
                    .split(vertical[1]);
                (stacked[0], stacked[1])
            }
        };

        Self {
            header: vertical[0],
            tree,
            menu,
            footer: vertical[2],
            tier,
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width || !has_hint {
            current = candidate;
            has_hint = true;
        } else {
            out.push(current);
            current = format!("{prefix}{hint}");
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_layout_puts_menu_beside_tree() {
        let layout = AppLayout::new(Rect::new(0, 0, 120, 40), 5);
        assert_eq!(layout.tier, LayoutTier::Wide);
        assert_eq!(layout.menu.width, MENU_WIDTH);
        assert_eq!(layout.tree.y, layout.menu.y);
    }

    #[test]
    fn test_narrow_layout_stacks_menu() {
        let layout = AppLayout::new(Rect::new(0, 0, 60, 40), 4);
        assert_eq!(layout.tier, LayoutTier::Narrow);
        assert_eq!(layout.menu.height, 6);
        assert!(layout.menu.y > layout.tree.y);
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let lines = pack_hint_lines(&["[q] Quit", "[Tab] Focus", "[p] Profile"], 22);
        assert_eq!(lines, vec![" [q] Quit  [Tab] Focus", " [p] Profile"]);
        assert!(pack_hint_lines(&[], 40).is_empty());
    }
}
