#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Discrete commands the presentation layer maps keyboard input onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Commit,
}

/// Events carried through the debounce scheduler back into the controller.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    RefreshSuggestions { keyword: String },
}

/// Notifications flowing out of the controller to its host.
/// `TextChanged` fires on every keystroke; `ValueCommitted` only when a
/// selection is finalized. Consumers must not conflate the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    TextChanged { value: String },
    ValueCommitted { value: String },
}

/// What a controller or widget operation did. Signals ride on the returned
/// reaction, so a host that ignores them simply misses the notification;
/// nothing fails.
#[derive(Debug, Clone, Default)]
pub struct Reaction {
    pub handled: bool,
    pub request_render: bool,
    pub signals: Vec<Signal>,
}

impl Reaction {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            request_render: true,
            signals: Vec::new(),
        }
    }

    pub fn with_signal(signal: Signal) -> Self {
        Self {
            handled: true,
            request_render: true,
            signals: vec![signal],
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.handled |= other.handled;
        self.request_render |= other.request_render;
        self.signals.extend(other.signals);
    }

    pub fn committed_value(&self) -> Option<&str> {
        self.signals.iter().find_map(|signal| match signal {
            Signal::ValueCommitted { value } => Some(value.as_str()),
            _ => None,
        })
    }
}
