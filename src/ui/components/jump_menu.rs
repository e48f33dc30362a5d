use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::bucket::BucketKey;
use crate::session::surface::{CrownVariant, MenuEntry};
use crate::ui::theme::Theme;

const CROWN: &str = "\u{265b}";

pub fn bucket_title(bucket: BucketKey) -> String {
    match bucket {
        BucketKey::Level(0) => "Not started".to_string(),
        BucketKey::Level(n) => format!("Level {n}"),
        BucketKey::FinalLevel => "Final level".to_string(),
        BucketKey::Crown => "Complete".to_string(),
        BucketKey::Decayed => "Needs review".to_string(),
        BucketKey::LastLevel => "Last opened".to_string(),
    }
}

pub struct JumpMenuWidget<'a> {
    entries: &'a [MenuEntry],
    selected: Option<usize>,
    theme: &'a Theme,
}

impl<'a> JumpMenuWidget<'a> {
    pub fn new(entries: &'a [MenuEntry], selected: Option<usize>, theme: &'a Theme) -> Self {
        Self {
            entries,
            selected,
            theme,
        }
    }
}

impl Widget for JumpMenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Jump ")
            .border_style(Style::default().fg(if self.selected.is_some() {
                colors.accent()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.entries.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                " nothing to jump to",
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let crown_color = match (entry.bucket, entry.variant) {
                    (BucketKey::Decayed, _) => colors.decayed(),
                    (_, CrownVariant::Earned) => colors.crown_earned(),
                    (_, CrownVariant::NotYetEarned) => colors.crown_unearned(),
                };
                let mut row_style = Style::default().fg(colors.fg());
                if self.selected == Some(i) {
                    row_style = row_style.bg(colors.cursor_bg()).add_modifier(Modifier::BOLD);
                }
                Line::from(vec![
                    Span::styled(format!(" {CROWN}"), row_style.fg(crown_color)),
                    Span::styled(format!("{:>2} ", entry.label), row_style.fg(crown_color)),
                    Span::styled(bucket_title(entry.bucket), row_style),
                    Span::styled(
                        format!("  {}", entry.target),
                        row_style.fg(colors.muted()),
                    ),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
