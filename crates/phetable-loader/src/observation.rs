//! Log-once observations.
//!
//! Conditions that are worth telling the user about but would flood the log
//! if reported per record (unparseable ages, unknown sex codes, ...) are
//! reported through an [`ObservationLog`]: the first note under a key is
//! emitted as a warning, later ones are dropped.

use std::collections::HashSet;

use tracing::warn;

/// An age value could not be parsed.
pub const INVALID_AGE: &str = "invalid-age";
/// The diagnosis stream has no age column.
pub const MISSING_AGE_COLUMN: &str = "missing-age-column";
/// A diagnosis era flag named neither 9 nor 10.
pub const UNRECOGNIZED_DIAGNOSIS_ERA: &str = "unrecognized-diagnosis-era";
/// A translation row's vocabulary id named neither 9 nor 10.
pub const UNRECOGNIZED_TRANSLATION_ERA: &str = "unrecognized-translation-era";
/// A demographics sex code matched neither configured token.
pub const UNRECOGNIZED_SEX: &str = "unrecognized-sex";

/// Set of observation keys already reported.
#[derive(Debug, Default)]
pub struct ObservationLog {
    seen: HashSet<&'static str>,
}

impl ObservationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `message` if nothing was noted under `key` yet.
    ///
    /// The message is only built when it is emitted. Returns true if it was.
    pub fn note<F>(&mut self, key: &'static str, message: F) -> bool
    where
        F: FnOnce() -> String,
    {
        if self.seen.insert(key) {
            warn!("{}", message());
            true
        } else {
            false
        }
    }

    /// Returns true if something was noted under `key`.
    pub fn has_noted(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Returns the number of distinct observations.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if nothing was noted.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
