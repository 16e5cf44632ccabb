//! Core types shared by the normalizer and the batch driver

use crate::error::NormalizeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of normalizing one piece of quoted text.
///
/// Every variant carries (or implies) the text to write out; callers that
/// only want a string can use [`Normalized::into_text`]. Input left alone
/// because it had no quotes is `Unquoted`, input left alone because the
/// transform failed is `Fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Quoted lines were found and reflowed
    Reflowed(String),

    /// No quoted lines; the input trimmed of outer whitespace
    Unquoted(String),

    /// Input was empty or whitespace only
    Blank,

    /// Every quoted line was empty once its markers were removed
    StrippedEmpty,

    /// Transform failed; the original input is returned untouched
    Fallback {
        original: String,
        error: NormalizeError,
    },
}

impl Normalized {
    /// Text to hand back to the caller
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Reflowed(text) | Self::Unquoted(text) => text,
            Self::Blank | Self::StrippedEmpty => "",
            Self::Fallback { original, .. } => original,
        }
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Reflowed(text) | Self::Unquoted(text) => text,
            Self::Blank | Self::StrippedEmpty => String::new(),
            Self::Fallback { original, .. } => original,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Reflowed(_) => OutcomeKind::Reflowed,
            Self::Unquoted(_) => OutcomeKind::Unquoted,
            Self::Blank => OutcomeKind::Blank,
            Self::StrippedEmpty => OutcomeKind::StrippedEmpty,
            Self::Fallback { .. } => OutcomeKind::Fallback,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

impl fmt::Display for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Data-free tag of a [`Normalized`] outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Reflowed,
    Unquoted,
    Blank,
    StrippedEmpty,
    Fallback,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reflowed => "reflowed",
            Self::Unquoted => "unquoted",
            Self::Blank => "blank",
            Self::StrippedEmpty => "stripped_empty",
            Self::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Totals for one batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchReport {
    /// Files discovered in the input directory
    pub discovered: usize,

    /// Files written to the output directory
    pub processed: usize,

    /// Files that could not be read, decoded, encoded or written
    pub errors: usize,

    /// Processed files whose text had no quoted lines
    pub unquoted: usize,

    /// Processed files written unchanged after a transform failure
    pub fallbacks: usize,

    /// Files copied into the backup directory
    pub backed_up: usize,

    /// Input files removed after confirmation
    pub deleted: usize,
}

impl BatchReport {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.errors == 0
    }

    pub(crate) const fn record(&mut self, kind: OutcomeKind) {
        self.processed += 1;
        match kind {
            OutcomeKind::Unquoted => self.unquoted += 1,
            OutcomeKind::Fallback => self.fallbacks += 1,
            OutcomeKind::Reflowed | OutcomeKind::Blank | OutcomeKind::StrippedEmpty => {}
        }
    }
}
