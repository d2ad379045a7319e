//! Phecode identifier types.
//!
//! Phecodes are kept as their curated string form (`"250.2"`, `"008.5"`).
//! Once the vocabulary is finalized every phecode is referred to by its
//! position in the sorted vocabulary, a [`PheIndex`].

/// A phecode identifier as it appears in the reference tables.
///
/// # Examples
///
/// ```
/// use phetable_types::Phecode;
///
/// let diabetes: Phecode = "250.2".to_string();
/// ```
pub type Phecode = String;

/// Position of a phecode in the finalized, sorted vocabulary.
pub type PheIndex = usize;
