use crate::palette::{Palette, Tone};

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

/// Centralized styles so every panel of the dialog looks the same.
pub struct Theme;

impl Theme {
    pub const KEY_FG: Color = Color::Rgb(255, 255, 255);

    pub fn label() -> Style {
        Style::default()
            .fg(Palette::ACCENT.tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted() -> Style {
        Style::default().fg(Palette::BORDER.tui())
    }

    pub fn status(tone: Tone) -> Style {
        Style::default()
            .fg(Palette::for_tone(tone).tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn backdrop<'a>() -> Block<'a> {
        Block::default()
    }

    /// Bordered panel; the focused one gets the accent border.
    pub fn panel<'a>(title: impl Into<String>, focused: bool) -> Block<'a> {
        let border = if focused {
            Palette::ACCENT.tui()
        } else {
            Palette::BORDER.tui()
        };
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(Self::title_line(title))
            .title_alignment(Alignment::Left)
    }

    pub fn popup<'a>(title: impl Into<String>) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Palette::INFO.tui()))
            .title(Self::title_line(title))
            .title_alignment(Alignment::Center)
    }

    pub fn title_line(title: impl Into<String>) -> Line<'static> {
        Line::from(vec![Span::styled(
            format!(" {} ", title.into()),
            Self::label(),
        )])
    }

    pub fn span(text: impl Into<String>) -> Span<'static> {
        Span::raw(text.into())
    }

    /// Key hint chip; disabled chips are drawn muted while a request runs.
    pub fn key_chip(text: impl Into<String>, enabled: bool) -> Span<'static> {
        let style = if enabled {
            Style::default()
                .fg(Self::KEY_FG)
                .bg(Palette::ACCENT.tui())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Palette::BORDER.tui())
                .add_modifier(Modifier::DIM)
        };
        Span::styled(format!(" {} ", text.into()), style)
    }

    pub fn bullet() -> Span<'static> {
        Self::span(" • ")
    }

    pub fn centered(area: Rect, width_percent: u16, height: u16) -> Rect {
        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [cell] = Layout::horizontal([Constraint::Percentage(width_percent)])
            .flex(Flex::Center)
            .areas(row);
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = Theme::centered(area, 60, 10);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 10);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }

    #[test]
    fn disabled_chip_is_not_highlighted() {
        let chip = Theme::key_chip("Ctrl+G", false);
        assert_eq!(chip.content, " Ctrl+G ");
        assert_eq!(chip.style.bg, None);
    }
}
