//! Prompt, menu, and table primitives shared by the awsnav wizards.

mod menu;
mod prompt;
mod table;

pub use menu::{Choice, Menu, Nav};
pub use prompt::{confirm, confirm_typed, input, input_default, input_optional, names_match, pause, secret};
pub use table::{Table, human_size};
