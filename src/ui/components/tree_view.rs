use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::skill::SkillRecord;
use crate::ui::theme::Theme;

pub struct TreeViewWidget<'a> {
    rows: &'a [(i64, Vec<usize>)],
    skills: &'a [SkillRecord],
    scroll: usize,
    cursor: Option<usize>,
    last_opened: Option<usize>,
    theme: &'a Theme,
}

impl<'a> TreeViewWidget<'a> {
    pub fn new(
        rows: &'a [(i64, Vec<usize>)],
        skills: &'a [SkillRecord],
        scroll: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            rows,
            skills,
            scroll,
            cursor: None,
            last_opened: None,
            theme,
        }
    }

    pub fn cursor(mut self, cursor: Option<usize>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn last_opened(mut self, last_opened: Option<usize>) -> Self {
        self.last_opened = last_opened;
        self
    }

    fn skill_span(&self, pos: usize) -> Span<'static> {
        let colors = &self.theme.colors;
        let skill = &self.skills[pos];
        let mut style = if !skill.accessible {
            Style::default().fg(colors.locked())
        } else if skill.decayed {
            Style::default().fg(colors.decayed())
        } else if skill.is_complete() {
            Style::default().fg(colors.crown_earned())
        } else {
            Style::default().fg(colors.fg())
        };
        if self.cursor == Some(pos) {
            style = style.bg(colors.cursor_bg()).add_modifier(Modifier::BOLD);
        }
        let marker = if self.last_opened == Some(pos) { "*" } else { " " };
        let progress = if skill.has_known_levels() {
            format!("{}/{}", skill.finished_levels, skill.levels)
        } else {
            "?".to_string()
        };
        Span::styled(
            format!("{marker}[{} {progress}] ", skill.display_name()),
            style,
        )
    }
}

impl Widget for TreeViewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Learn ")
            .border_style(Style::default().fg(if self.cursor.is_some() {
                colors.accent()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .rows
            .iter()
            .skip(self.scroll)
            .take(inner.height as usize)
            .map(|(row, members)| {
                let mut spans = vec![Span::styled(
                    format!("{row:>4} \u{2502}"),
                    Style::default().fg(colors.muted()),
                )];
                spans.extend(members.iter().map(|&pos| self.skill_span(pos)));
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
