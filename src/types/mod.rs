// pagekeep shared type definitions
// Each submodule defines the records one engine owns.

pub mod boost;
pub mod collection;
pub mod errors;
pub mod note;
pub mod preview;
pub mod reading_list;
pub mod settings;
