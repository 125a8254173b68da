use crate::candidate::Candidate;
use crate::runtime::event::{Command, ControlEvent, Direction, Reaction, Signal};
use crate::runtime::listbox::{ListboxSync, OptionExtent, Viewport, desired_scroll};
use crate::runtime::scheduler::{Scheduler, SchedulerCommand};
use crate::search::substring::{Match, filter};
use std::time::{Duration, Instant};

/// Quiescence window between the last keystroke and a suggestion refresh.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

const REFRESH_KEY: &str = "refresh";

/// The autocomplete session state machine.
///
/// Owns the text value, the open/closed flag, the highlight and the current
/// suggestion list, and mutates them exclusively through the operations
/// below. Filtering after typing is debounced through an instance-owned
/// [`Scheduler`]; the host drives time by calling [`Autocomplete::tick`]
/// from its event loop. Dropping the controller drops the scheduler and
/// every pending refresh with it, so no callback can reach a dead session.
pub struct Autocomplete {
    options: Vec<Candidate>,
    value: String,
    suggestions: Vec<Match>,
    highlight: Option<usize>,
    popup_open: bool,
    debounce: Duration,
    scheduler: Scheduler,
}

impl Autocomplete {
    pub fn new(options: Vec<Candidate>) -> Self {
        Self {
            options,
            value: String::new(),
            suggestions: Vec::new(),
            highlight: None,
            popup_open: false,
            debounce: DEFAULT_DEBOUNCE,
            scheduler: Scheduler::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn popup_open(&self) -> bool {
        self.popup_open
    }

    /// Position of the highlighted suggestion, `None` for no highlight.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn suggestions(&self) -> &[Match] {
        &self.suggestions
    }

    pub fn options(&self) -> &[Candidate] {
        &self.options
    }

    /// Updates the text value synchronously and schedules a debounced
    /// re-filter. Only the newest call within the quiescence window reaches
    /// the match engine; earlier pending refreshes are invalidated.
    pub fn set_text(&mut self, raw: impl Into<String>, now: Instant) -> Reaction {
        self.value = raw.into();
        self.scheduler.schedule(
            SchedulerCommand::Debounce {
                key: REFRESH_KEY.to_string(),
                delay: self.debounce,
                event: ControlEvent::RefreshSuggestions {
                    keyword: self.value.clone(),
                },
            },
            now,
        );
        Reaction::with_signal(Signal::TextChanged {
            value: self.value.clone(),
        })
    }

    /// Applies any refresh that came due. Hosts call this every loop turn;
    /// [`Autocomplete::poll_timeout`] bounds how long they may sleep first.
    pub fn tick(&mut self, now: Instant) -> Reaction {
        let mut reaction = Reaction::ignored();
        for event in self.scheduler.drain_ready(now) {
            match event {
                ControlEvent::RefreshSuggestions { keyword } => {
                    self.refresh(&keyword);
                    reaction.merge(Reaction::handled());
                }
            }
        }
        reaction
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        self.scheduler.poll_timeout(now, default_timeout)
    }

    /// Invalidates any scheduled refresh. Dropping the controller has the
    /// same effect; this covers hosts that detach a session they keep.
    pub fn cancel_pending(&mut self, now: Instant) {
        self.scheduler.schedule(
            SchedulerCommand::Cancel {
                key: REFRESH_KEY.to_string(),
            },
            now,
        );
    }

    fn refresh(&mut self, keyword: &str) {
        self.suggestions = filter(keyword, &self.options);
        self.highlight = None;
        self.popup_open = true;
    }

    /// Opens with the empty-query suggestion list, highlighting the
    /// candidate whose identity equals the current value (unfiltered order).
    /// If already open, closes without touching suggestions or highlight.
    pub fn toggle_popup(&mut self) -> Reaction {
        if self.popup_open {
            self.popup_open = false;
            return Reaction::handled();
        }

        self.highlight = self
            .options
            .iter()
            .position(|candidate| candidate.label == self.value);
        self.suggestions = filter("", &self.options);
        self.popup_open = true;
        Reaction::handled()
    }

    /// Resets the text value unconditionally; when open, also resets the
    /// highlight and recomputes the empty-query suggestions immediately.
    pub fn clear(&mut self) -> Reaction {
        self.value.clear();
        if self.popup_open {
            self.highlight = None;
            self.suggestions = filter("", &self.options);
        }
        Reaction::handled()
    }

    /// Circular highlight movement. Ignored on an empty suggestion list.
    pub fn move_highlight(&mut self, direction: Direction) -> Reaction {
        if self.suggestions.is_empty() {
            return Reaction::ignored();
        }

        let last = self.suggestions.len() - 1;
        self.highlight = Some(match direction {
            Direction::Next => match self.highlight {
                Some(index) if index == last => 0,
                Some(index) => index + 1,
                None => 0,
            },
            Direction::Previous => match self.highlight {
                Some(0) | None => last,
                Some(index) => index - 1,
            },
        });
        Reaction::handled()
    }

    /// Commits the highlighted suggestion. Without a highlight, falls back
    /// to the first suggestion when more than one exists; otherwise just
    /// closes. The more-than-one fallback mirrors the established behavior.
    pub fn commit_highlighted(&mut self) -> Reaction {
        let target = self
            .highlight
            .and_then(|index| self.suggestions.get(index))
            .map(|m| m.value.clone());
        if let Some(value) = target {
            return self.select_value(value);
        }

        if self.suggestions.len() > 1 {
            let value = self.suggestions[0].value.clone();
            return self.select_value(value);
        }

        self.popup_open = false;
        Reaction::handled()
    }

    /// Explicit (pointer) selection of a known identity.
    pub fn select_value(&mut self, identity: impl Into<String>) -> Reaction {
        self.value = identity.into();
        self.popup_open = false;
        Reaction::with_signal(Signal::ValueCommitted {
            value: self.value.clone(),
        })
    }

    pub fn handle_command(&mut self, command: Command) -> Reaction {
        match command {
            Command::Next => self.move_highlight(Direction::Next),
            Command::Previous => self.move_highlight(Direction::Previous),
            Command::Commit => self.commit_highlighted(),
        }
    }

    /// Derived listbox synchronization. `None` while the popup is closed —
    /// no attribute or scroll synchronization occurs then. With no
    /// highlight the active option clears and the scroll resets to the
    /// start; otherwise the highlighted identity is exposed and the scroll
    /// moves just far enough to keep its row visible.
    pub fn listbox_sync(&self, viewport: &Viewport, extents: &[OptionExtent]) -> Option<ListboxSync> {
        if !self.popup_open {
            return None;
        }

        let Some(index) = self.highlight else {
            return Some(ListboxSync {
                active_option: None,
                scroll_offset: 0,
            });
        };

        let active_option = self.suggestions.get(index).map(|m| m.value.clone());
        let scroll_offset = match extents.get(index) {
            Some(extent) => desired_scroll(viewport, extent),
            None => viewport.offset,
        };

        Some(ListboxSync {
            active_option,
            scroll_offset,
        })
    }
}
