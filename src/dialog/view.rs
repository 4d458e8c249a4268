use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
};
use tracing::debug;

use super::controller::{DialogAction, DialogController};
use crate::gemini::{MAX_TTS_CHARS, ReqwestTransport};
use crate::host::TerminalHost;
use crate::playback::OsPlayer;
use crate::tui::{TextField, Theme};
use crate::utils::char_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    ApiKey,
    Prompt,
    TtsText,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::ApiKey => Focus::Prompt,
            Focus::Prompt => Focus::TtsText,
            Focus::TtsText => Focus::ApiKey,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::ApiKey => Focus::TtsText,
            Focus::Prompt => Focus::ApiKey,
            Focus::TtsText => Focus::Prompt,
        }
    }
}

struct DialogView {
    controller: DialogController,
    focus: Focus,
    result_scroll: u16,
    notice: Option<String>,
}

impl DialogView {
    fn focused_field(&mut self) -> &mut TextField {
        match self.focus {
            Focus::ApiKey => &mut self.controller.api_key,
            Focus::Prompt => &mut self.controller.prompt,
            Focus::TtsText => &mut self.controller.tts_text,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Theme::backdrop(), area);
        let [key_area, prompt_area, result_area, tts_area, status_area, help_area] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Min(5),
                Constraint::Length(6),
                Constraint::Length(1),
                Constraint::Length(4),
            ])
            .areas(area);

        let tts_title = format!(
            "Text for TTS ({}/{})",
            char_count(&self.controller.tts_text.text()),
            MAX_TTS_CHARS
        );
        let focus = self.focus;
        render_field(
            frame,
            &mut self.controller.api_key,
            "Google AI API Key",
            key_area,
            focus == Focus::ApiKey,
        );
        render_field(
            frame,
            &mut self.controller.prompt,
            "Prompt",
            prompt_area,
            focus == Focus::Prompt,
        );
        render_field(
            frame,
            &mut self.controller.tts_text,
            &tts_title,
            tts_area,
            focus == Focus::TtsText,
        );

        let result = Paragraph::new(self.controller.result())
            .block(Theme::panel("Result", false))
            .wrap(Wrap { trim: false })
            .scroll((self.result_scroll, 0));
        frame.render_widget(result, result_area);

        let status = self.controller.status();
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", status.text),
                Theme::status(status.tone),
            ))),
            status_area,
        );

        let idle = self.controller.busy().is_none();
        let help = Paragraph::new(vec![
            Line::from(vec![
                Theme::key_chip("Ctrl+S", idle),
                Theme::span(" save key"),
                Theme::bullet(),
                Theme::key_chip("Ctrl+T", idle),
                Theme::span(" test connection"),
                Theme::bullet(),
                Theme::key_chip("Ctrl+G", idle),
                Theme::span(" generate text"),
                Theme::bullet(),
                Theme::key_chip("Ctrl+P", idle),
                Theme::span(" speak"),
            ]),
            Line::from(vec![
                Theme::key_chip("Tab", true),
                Theme::span(" next field"),
                Theme::bullet(),
                Theme::key_chip("PgUp/PgDn", true),
                Theme::span(" scroll result"),
                Theme::bullet(),
                Theme::key_chip("Esc", true),
                Theme::span(" close"),
            ]),
        ])
        .block(Theme::panel("Gemini TTS & AI Assistant", false))
        .wrap(Wrap { trim: true });
        frame.render_widget(help, help_area);

        if let Some(notice) = &self.notice {
            let height = popup_height(notice, area.height);
            let popup_area = Theme::centered(area, 60, height);
            let mut lines: Vec<Line> = notice.lines().map(Line::from).collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Press any key", Theme::muted())));
            frame.render_widget(Clear, popup_area);
            frame.render_widget(
                Paragraph::new(lines)
                    .block(Theme::popup("Notice"))
                    .wrap(Wrap { trim: false }),
                popup_area,
            );
            return;
        }

        let (field, field_area) = match self.focus {
            Focus::ApiKey => (&self.controller.api_key, key_area),
            Focus::Prompt => (&self.controller.prompt, prompt_area),
            Focus::TtsText => (&self.controller.tts_text, tts_area),
        };
        let (cursor_row, cursor_col) = field.cursor();
        let visible_row = cursor_row.saturating_sub(field.scroll_top());
        let cursor_x =
            field_area.x + 1 + (cursor_col as u16).min(field_area.width.saturating_sub(2));
        let cursor_y =
            field_area.y + 1 + (visible_row as u16).min(field_area.height.saturating_sub(2));
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn render_field(frame: &mut Frame, field: &mut TextField, title: &str, area: Rect, focused: bool) {
    let view_height = area.height.saturating_sub(2) as usize;
    field.ensure_cursor_visible(view_height.max(1));
    let widget = Paragraph::new(field.display())
        .block(Theme::panel(title, focused))
        .scroll((field.scroll_top() as u16, 0));
    frame.render_widget(widget, area);
}

fn edit_field(field: &mut TextField, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            field.insert_char(c);
        }
        KeyCode::Enter => field.insert_newline(),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Up => field.move_up(),
        KeyCode::Down => field.move_down(),
        KeyCode::Home => field.move_home(),
        KeyCode::End => field.move_end(),
        _ => {}
    }
}

/// Notice lines plus borders and the dismiss hint, capped to the screen.
fn popup_height(notice: &str, available: u16) -> u16 {
    let lines = u16::try_from(notice.lines().count()).unwrap_or(u16::MAX);
    lines.saturating_add(4).min(available)
}

fn action_for(key: &KeyEvent) -> Option<DialogAction> {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char('s') => Some(DialogAction::SaveKey),
        KeyCode::Char('t') => Some(DialogAction::TestConnection),
        KeyCode::Char('g') => Some(DialogAction::GenerateText),
        KeyCode::Char('p') => Some(DialogAction::GenerateSpeech),
        _ => None,
    }
}

/// Keys pressed while a request was blocking the loop are discarded.
fn drain_input() -> Result<()> {
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }
    Ok(())
}

async fn run_action(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    view: &mut DialogView,
    host: &mut TerminalHost,
    transport: &ReqwestTransport,
    action: DialogAction,
) -> Result<()> {
    debug!(?action, "dialog action");
    view.controller.begin(action);
    terminal.draw(|frame| view.render(frame))?;
    match action {
        DialogAction::SaveKey => view.controller.save_key(host),
        DialogAction::TestConnection => {
            view.controller.test_connection(host, transport).await;
        }
        DialogAction::GenerateText => {
            view.controller.generate_text(host, transport).await;
            view.result_scroll = 0;
        }
        DialogAction::GenerateSpeech => {
            view.controller
                .generate_speech(host, transport, &OsPlayer)
                .await;
        }
    }
    drain_input()?;

    if view.notice.is_none() {
        view.notice = host.take_notice();
    }
    Ok(())
}

pub async fn run(host: &mut TerminalHost, controller: DialogController) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.show_cursor()?;

    host.capture_notices(true);
    let dialog_result: Result<()> = async {
        let transport = ReqwestTransport::new();
        let mut view = DialogView {
            controller,
            focus: Focus::ApiKey,
            result_scroll: 0,
            notice: None,
        };
        view.controller.load_config(host);
        view.notice = host.take_notice();

        loop {
            terminal.draw(|frame| view.render(frame))?;

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            match event::read()? {
                Event::Paste(text) if view.notice.is_none() => {
                    view.focused_field().insert_str(&text);
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if view.notice.is_some() {
                        view.notice = host.take_notice();
                        continue;
                    }
                    if key.code == KeyCode::Esc
                        || (key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    if let Some(action) = action_for(&key) {
                        run_action(&mut terminal, &mut view, host, &transport, action).await?;
                        continue;
                    }
                    match key.code {
                        KeyCode::Tab => view.focus = view.focus.next(),
                        KeyCode::BackTab => view.focus = view.focus.previous(),
                        KeyCode::PageUp => {
                            view.result_scroll = view.result_scroll.saturating_sub(5);
                        }
                        KeyCode::PageDown => {
                            view.result_scroll = view.result_scroll.saturating_add(5);
                        }
                        _ => edit_field(view.focused_field(), key),
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
    .await;
    host.capture_notices(false);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    dialog_result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn popup_height_fits_the_notice_and_the_screen() {
        assert_eq!(popup_height("one line", 40), 5);
        assert_eq!(popup_height("a\nb\nc", 40), 7);
        assert_eq!(popup_height("a\nb\nc", 6), 6);

        let huge = "x\n".repeat(usize::from(u16::MAX) + 10);
        assert_eq!(popup_height(&huge, 30), 30);
    }

    #[test]
    fn control_keys_map_to_actions() {
        assert_eq!(action_for(&ctrl('s')), Some(DialogAction::SaveKey));
        assert_eq!(action_for(&ctrl('t')), Some(DialogAction::TestConnection));
        assert_eq!(action_for(&ctrl('g')), Some(DialogAction::GenerateText));
        assert_eq!(action_for(&ctrl('p')), Some(DialogAction::GenerateSpeech));
        assert_eq!(action_for(&ctrl('x')), None);
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE)),
            None
        );
    }

    #[test]
    fn focus_cycles_through_fields() {
        let mut focus = Focus::ApiKey;
        for _ in 0..3 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::ApiKey);
        assert_eq!(Focus::ApiKey.previous(), Focus::TtsText);
    }

    #[test]
    fn typing_skips_control_chords() {
        let mut field = TextField::single_line();
        edit_field(&mut field, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        edit_field(&mut field, ctrl('b'));
        edit_field(&mut field, KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT));
        assert_eq!(field.text(), "aB");
    }
}
