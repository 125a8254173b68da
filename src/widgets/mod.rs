pub mod combobox;
pub mod text_edit;

pub use combobox::ComboBox;
