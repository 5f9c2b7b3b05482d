//! Terminal front end
//!
//! A crossterm line prompt for input and a text grid for results.

pub mod prompt;
pub mod table;

pub use prompt::{LineInput, Prompt, PromptAction};
pub use table::{render_table, row_count};
