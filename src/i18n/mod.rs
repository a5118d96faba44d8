//! Localized UI text for the practice front ends.
//!
//! - `language`: the `Language` a learner picks for prompts and labels
//! - `strings`: every user-facing label, one table per language
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::Language;
//!
//! let german = Language::from_code("de")?;
//! println!("{}", german.strings().travel_title);
//! ```

mod language;
mod strings;

pub use language::Language;
pub use strings::{LanguageStrings, ENGLISH_STRINGS, GERMAN_STRINGS};
