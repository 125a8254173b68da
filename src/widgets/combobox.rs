use crate::candidate::Candidate;
use crate::runtime::controller::Autocomplete;
use crate::runtime::event::{Command, Reaction, Signal};
use crate::runtime::listbox::{OptionExtent, Viewport};
use crate::search::substring::MatchSpan;
use crate::widgets::text_edit;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Stylize;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const NAME_COLUMN: usize = 26;

/// Terminal combobox: an input line plus a bounded suggestions window.
///
/// Pure consumer of the [`Autocomplete`] engine — it maps keys onto engine
/// operations, applies the engine's listbox sync output to its viewport,
/// and renders the match fragments it is handed.
pub struct ComboBox {
    label: String,
    engine: Autocomplete,
    cursor: usize,
    max_visible: usize,
    scroll_offset: usize,
    active_option: Option<String>,
    committed: Option<String>,
}

impl ComboBox {
    pub fn new(label: impl Into<String>, options: Vec<Candidate>) -> Self {
        Self {
            label: label.into(),
            engine: Autocomplete::new(options),
            cursor: 0,
            max_visible: 8,
            scroll_offset: 0,
            active_option: None,
            committed: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.cursor = text_edit::char_count(&value);
        self.engine = self.engine.with_value(value);
        self
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible.max(1);
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.engine = self.engine.with_debounce(window);
        self
    }

    pub fn engine(&self) -> &Autocomplete {
        &self.engine
    }

    /// Last value finalized through Enter or an explicit selection.
    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    pub fn active_option(&self) -> Option<&str> {
        self.active_option.as_deref()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Reaction {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return Reaction::ignored();
        }

        let reaction = match key.code {
            KeyCode::Char(ch) => self.edit(now, |value, cursor| {
                text_edit::insert_char(value, cursor, ch);
                true
            }),
            KeyCode::Backspace => self.edit(now, text_edit::backspace_char),
            KeyCode::Left => {
                if text_edit::move_left(&mut self.cursor, self.engine.value()) {
                    Reaction::handled()
                } else {
                    Reaction::ignored()
                }
            }
            KeyCode::Right => {
                if text_edit::move_right(&mut self.cursor, self.engine.value()) {
                    Reaction::handled()
                } else {
                    Reaction::ignored()
                }
            }
            KeyCode::Home => {
                if text_edit::move_to_start(&mut self.cursor) {
                    Reaction::handled()
                } else {
                    Reaction::ignored()
                }
            }
            KeyCode::End => {
                if text_edit::move_to_end(&mut self.cursor, self.engine.value()) {
                    Reaction::handled()
                } else {
                    Reaction::ignored()
                }
            }
            KeyCode::Up => self.engine.handle_command(Command::Previous),
            KeyCode::Down => self.engine.handle_command(Command::Next),
            KeyCode::Enter => self.engine.handle_command(Command::Commit),
            KeyCode::Tab => self.engine.toggle_popup(),
            KeyCode::Esc => {
                self.cursor = 0;
                self.engine.clear()
            }
            _ => Reaction::ignored(),
        };

        self.absorb(&reaction);
        reaction
    }

    /// Explicit (pointer) selection of a suggestion row.
    pub fn select(&mut self, identity: impl Into<String>) -> Reaction {
        let reaction = self.engine.select_value(identity);
        self.absorb(&reaction);
        reaction
    }

    pub fn tick(&mut self, now: Instant) -> Reaction {
        let reaction = self.engine.tick(now);
        self.absorb(&reaction);
        reaction
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        self.engine.poll_timeout(now, default_timeout)
    }

    fn edit(
        &mut self,
        now: Instant,
        apply: impl FnOnce(&mut String, &mut usize) -> bool,
    ) -> Reaction {
        let mut value = self.engine.value().to_string();
        if !apply(&mut value, &mut self.cursor) {
            return Reaction::ignored();
        }
        self.engine.set_text(value, now)
    }

    fn absorb(&mut self, reaction: &Reaction) {
        for signal in &reaction.signals {
            if let Signal::ValueCommitted { value } = signal {
                self.committed = Some(value.clone());
                self.cursor = text_edit::char_count(value);
            }
        }
        self.sync_viewport();
    }

    fn sync_viewport(&mut self) {
        let count = self.engine.suggestions().len();
        let viewport = Viewport {
            offset: self.scroll_offset,
            height: self.max_visible,
            content_height: count,
        };
        let extents: Vec<OptionExtent> = (0..count)
            .map(|offset| OptionExtent { offset, height: 1 })
            .collect();

        if let Some(sync) = self.engine.listbox_sync(&viewport, &extents) {
            self.scroll_offset = sync.scroll_offset;
            self.active_option = sync.active_option;
        }
    }

    pub fn cursor_col(&self) -> u16 {
        let prefix = format!("> {}: ", self.label);
        let width = UnicodeWidthStr::width(prefix.as_str())
            + text_edit::width_before_cursor(self.engine.value(), self.cursor);
        width as u16
    }

    pub fn render_lines(&self) -> Vec<String> {
        let toggle = if self.engine.popup_open() { "▴" } else { "▾" };
        let mut lines = vec![format!(
            "> {}: {} {}",
            self.label,
            self.engine.value(),
            toggle.dark_grey()
        )];

        if !self.engine.popup_open() {
            return lines;
        }

        let suggestions = self.engine.suggestions();
        if suggestions.is_empty() {
            lines.push(format!("    {}", "No suggestions".dark_grey()));
            return lines;
        }

        let start = self.scroll_offset.min(suggestions.len().saturating_sub(1));
        let end = (start + self.max_visible).min(suggestions.len());
        for (index, m) in suggestions.iter().enumerate().take(end).skip(start) {
            let active = Some(index) == self.engine.highlight();
            let marker = if active {
                format!("{}", "❯".yellow())
            } else {
                " ".to_string()
            };
            let name = render_name(&m.name, active);
            let pad = NAME_COLUMN.saturating_sub(UnicodeWidthStr::width(m.name.text().as_str()));
            lines.push(format!(
                "  {} {}{} {}",
                marker,
                name,
                " ".repeat(pad),
                render_phone(&m.phone)
            ));
        }

        if suggestions.len() > self.max_visible {
            let footer = format!("{}-{} of {}", start + 1, end, suggestions.len());
            lines.push(format!("    {}", footer.dark_grey()));
        }

        let active_label = self.active_option.as_deref().unwrap_or("(none)");
        lines.push(format!(
            "    {}",
            format!("active option: {}", active_label).dark_grey()
        ));

        lines
    }
}

fn render_name(span: &MatchSpan, active: bool) -> String {
    if !span.is_hit() {
        let text = span.text();
        return if active {
            format!("{}", text.bold())
        } else {
            text
        };
    }

    let matched = span.matched.as_str().cyan().bold();
    if active {
        format!(
            "{}{}{}",
            span.prefix.as_str().bold(),
            matched,
            span.suffix.as_str().bold()
        )
    } else {
        format!("{}{}{}", span.prefix, matched, span.suffix)
    }
}

fn render_phone(span: &MatchSpan) -> String {
    if !span.is_hit() {
        return format!("{}", span.text().dark_grey());
    }
    format!(
        "{}{}{}",
        span.prefix.as_str().dark_grey(),
        span.matched.as_str().cyan(),
        span.suffix.as_str().dark_grey()
    )
}

#[cfg(test)]
mod tests {
    use super::ComboBox;
    use crate::candidate::Candidate;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::{Duration, Instant};

    fn countries() -> Vec<Candidate> {
        vec![
            Candidate::new("MM", "Myanmar", "95"),
            Candidate::new("MN", "Mongolia", "976"),
            Candidate::new("MO", "Macao", "853"),
            Candidate::new("MK", "Macedonia", "389"),
            Candidate::new("MG", "Madagascar", "261"),
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(combobox: &mut ComboBox, code: KeyCode, now: Instant) {
        combobox.on_key(key(code), now);
    }

    #[test]
    fn typing_edits_the_value_and_filters_after_the_window() {
        let t0 = Instant::now();
        let mut combobox = ComboBox::new("Country", countries());
        press(&mut combobox, KeyCode::Char('m'), t0);
        press(&mut combobox, KeyCode::Char('y'), t0);
        assert_eq!(combobox.engine().value(), "my");
        assert_eq!(combobox.cursor_col(), 13); // "> Country: " + 2 chars

        combobox.tick(t0 + Duration::from_millis(201));
        assert!(combobox.engine().popup_open());
        assert_eq!(combobox.engine().suggestions().len(), 1);
        assert_eq!(combobox.engine().suggestions()[0].value, "Myanmar");
    }

    #[test]
    fn enter_commits_the_highlighted_row() {
        let t0 = Instant::now();
        let mut combobox = ComboBox::new("Country", countries());
        press(&mut combobox, KeyCode::Tab, t0);
        press(&mut combobox, KeyCode::Down, t0);
        press(&mut combobox, KeyCode::Down, t0);
        press(&mut combobox, KeyCode::Enter, t0);

        assert_eq!(combobox.committed(), Some("Mongolia"));
        assert_eq!(combobox.engine().value(), "Mongolia");
        assert!(!combobox.engine().popup_open());
    }

    #[test]
    fn viewport_follows_the_highlight() {
        let t0 = Instant::now();
        let mut combobox = ComboBox::new("Country", countries()).with_max_visible(2);
        press(&mut combobox, KeyCode::Tab, t0);
        assert_eq!(combobox.scroll_offset(), 0);

        for _ in 0..3 {
            press(&mut combobox, KeyCode::Down, t0);
        }
        assert_eq!(combobox.engine().highlight(), Some(2));
        assert_eq!(combobox.scroll_offset(), 1);
        assert_eq!(combobox.active_option(), Some("Macao"));

        press(&mut combobox, KeyCode::Up, t0);
        press(&mut combobox, KeyCode::Up, t0);
        assert_eq!(combobox.engine().highlight(), Some(0));
        assert_eq!(combobox.scroll_offset(), 0);
    }

    #[test]
    fn pointer_selection_commits_and_closes() {
        let t0 = Instant::now();
        let mut combobox = ComboBox::new("Country", countries());
        press(&mut combobox, KeyCode::Tab, t0);

        let reaction = combobox.select("Madagascar");
        assert_eq!(reaction.committed_value(), Some("Madagascar"));
        assert_eq!(combobox.committed(), Some("Madagascar"));
        assert!(!combobox.engine().popup_open());
        assert_eq!(combobox.cursor_col(), 21); // cursor jumps to the end
    }

    #[test]
    fn escape_clears_the_session() {
        let t0 = Instant::now();
        let mut combobox = ComboBox::new("Country", countries()).with_value("Myanmar");
        press(&mut combobox, KeyCode::Tab, t0);
        press(&mut combobox, KeyCode::Esc, t0);

        assert_eq!(combobox.engine().value(), "");
        assert_eq!(combobox.engine().highlight(), None);
        assert_eq!(combobox.engine().suggestions().len(), 5);
        assert_eq!(combobox.cursor_col(), 11);
    }

    #[test]
    fn closed_popup_renders_only_the_input_line() {
        let combobox = ComboBox::new("Country", countries());
        let lines = combobox.render_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Country"));
    }

    #[test]
    fn empty_results_render_a_no_suggestions_row() {
        let t0 = Instant::now();
        let mut combobox = ComboBox::new("Country", countries());
        press(&mut combobox, KeyCode::Char('z'), t0);
        combobox.tick(t0 + Duration::from_millis(201));

        assert!(combobox.engine().popup_open());
        let lines = combobox.render_lines();
        assert!(lines[1].contains("No suggestions"));
    }

    #[test]
    fn control_chords_are_ignored() {
        let t0 = Instant::now();
        let mut combobox = ComboBox::new("Country", countries());
        let reaction = combobox.on_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            t0,
        );
        assert!(!reaction.handled);
        assert_eq!(combobox.engine().value(), "");
    }
}
