//! Client library for the flashcard, kana and travel practice backends.

pub mod api;
pub mod config;
pub mod error;
pub mod formatter;
pub mod i18n;
pub mod importer;
pub mod kana;
pub mod recorder;
pub mod retry;
pub mod session;
pub mod travel;
pub mod vocabulary;
