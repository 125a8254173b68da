pub mod candidate;
pub mod runtime;
pub mod search;
pub mod terminal;
pub mod widgets;

pub use candidate::{Candidate, load_candidates, parse_candidates_json, parse_candidates_yaml};
pub use runtime::controller::{Autocomplete, DEFAULT_DEBOUNCE};
pub use runtime::event::{Command, Direction, Reaction, Signal};
pub use runtime::listbox::{ListboxSync, OptionExtent, Viewport};
pub use search::substring::{Match, MatchSpan, filter};
pub use widgets::ComboBox;
