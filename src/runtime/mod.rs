pub mod controller;
pub mod event;
pub mod listbox;
pub mod scheduler;

pub use controller::{Autocomplete, DEFAULT_DEBOUNCE};
