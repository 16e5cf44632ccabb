// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Quoted Email Reflow
//!
//! Turns `>`-quoted email text into continuous plain text: quote markers are
//! stripped, sentences end up on their own lines and configured keywords
//! (subject, sender, ...) start a new paragraph.
//!
//! # Features
//!
//! - Quote markers of any depth, with or without leading whitespace
//! - Sentence breaks after Japanese full stops, kept together with closing
//!   brackets and quotes
//! - Paragraph breaks before configured keywords
//! - Typed outcome telling clean input apart from a failed transform
//! - Batch cleaning of a directory with backups and configurable encoding
//!
//! # Example
//!
//! ```rust
//! use quote_reflow::normalize_text;
//!
//! let raw = "> 記：テストです。\n>> 本文はこちらです。";
//! let text = normalize_text(raw, &["記"]);
//!
//! assert_eq!(text, "記：テストです。\n本文はこちらです。");
//! ```

mod batch;
mod config;
mod error;
mod normalizer;
mod types;

pub use batch::{Cleaner, Confirm, KeepInput, Prompt, is_affirmative};
pub use config::{
    Config, DEFAULT_CONFIG_FILE, DEFAULT_KEYWORDS, KeywordsConfig, PathsConfig, ProcessingConfig,
};
pub use error::{CleanError, NormalizeError, Result};
pub use normalizer::{normalize, normalize_text};
pub use types::*;
