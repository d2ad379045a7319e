//! Phecode vocabulary and ICD code index.
//!
//! Associations are collected in a [`VocabularyBuilder`]. Finalizing the
//! builder (which consumes it) produces a [`VocabularyIndex`]:
//!
//! - the phecode universe, sorted and deduplicated; a phecode's position is
//!   its [`PheIndex`]
//! - all mapped ICD codes in one array, the ICD-9 block first and the
//!   ICD-10 block second, each sorted
//! - a dense `code_to_pheindex` array aligned with the code array
//!
//! Both lookups are binary searches.

use std::collections::{BTreeSet, HashMap};

use phetable_types::{IcdEra, PheIndex, Phecode, TranslationRow};

use crate::types::{PheError, PheResult};

/// Collects ICD code to phecode associations before finalization.
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    phecodes: BTreeSet<Phecode>,
    icd9: HashMap<String, Phecode>,
    icd10: HashMap<String, Phecode>,
}

impl VocabularyBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one association.
    ///
    /// `era_token` is searched for an embedded `9` or `10`. Returns false
    /// (and records nothing) if no era token is found or the phecode is
    /// blank. A later association for the same code and era replaces the
    /// earlier one.
    pub fn add_code(&mut self, code: &str, era_token: &str, phecode: &str) -> bool {
        if phecode.trim().is_empty() {
            return false;
        }
        let Some(era) = IcdEra::search(era_token) else {
            return false;
        };
        self.insert(code, era, phecode);
        true
    }

    /// Records one association from a translation row.
    pub fn add_row(&mut self, row: &TranslationRow) -> bool {
        self.add_code(&row.code, &row.vocabulary_id, &row.phecode)
    }

    fn insert(&mut self, code: &str, era: IcdEra, phecode: &str) {
        if !self.phecodes.contains(phecode) {
            self.phecodes.insert(phecode.to_string());
        }
        let codes = match era {
            IcdEra::Icd9 => &mut self.icd9,
            IcdEra::Icd10 => &mut self.icd10,
        };
        codes.insert(code.to_string(), phecode.to_string());
    }

    /// Returns the number of distinct phecodes seen so far.
    pub fn phecode_count(&self) -> usize {
        self.phecodes.len()
    }

    /// Builds the index.
    ///
    /// # Errors
    /// Returns [`PheError::UnknownPhecode`] if a mapped phecode cannot be
    /// located in the sorted universe.
    pub fn finalize(self) -> PheResult<VocabularyIndex> {
        let mut icd9: Vec<(String, Phecode)> = self.icd9.into_iter().collect();
        icd9.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut icd10: Vec<(String, Phecode)> = self.icd10.into_iter().collect();
        icd10.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let code_count = icd9.len() + icd10.len();
        let mut index = VocabularyIndex {
            phecodes: self.phecodes.into_iter().collect(),
            codes: Vec::with_capacity(code_count),
            icd9_count: icd9.len(),
            code_to_pheindex: Vec::with_capacity(code_count),
        };

        for (code, phecode) in icd9.into_iter().chain(icd10) {
            let pheindex = index.lookup(&phecode)?;
            index.codes.push(code);
            index.code_to_pheindex.push(pheindex);
        }

        Ok(index)
    }
}

/// Finalized, read-only vocabulary.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    phecodes: Vec<Phecode>,
    codes: Vec<String>,
    icd9_count: usize,
    code_to_pheindex: Vec<PheIndex>,
}

impl VocabularyIndex {
    /// Returns the index of a phecode.
    ///
    /// # Errors
    /// Returns [`PheError::UnknownPhecode`] if the exact phecode is absent.
    pub fn lookup(&self, phecode: &str) -> PheResult<PheIndex> {
        self.phecodes
            .binary_search_by(|p| p.as_str().cmp(phecode))
            .map_err(|_| PheError::UnknownPhecode {
                phecode: phecode.to_string(),
            })
    }

    /// Returns the phecode index a diagnosis code maps to.
    ///
    /// Only the block of the given era is searched.
    ///
    /// # Errors
    /// Returns [`PheError::UnknownCode`] if the code is not mapped under `era`.
    pub fn resolve(&self, code: &str, era: IcdEra) -> PheResult<PheIndex> {
        let (base, block) = match era {
            IcdEra::Icd9 => (0, &self.codes[..self.icd9_count]),
            IcdEra::Icd10 => (self.icd9_count, &self.codes[self.icd9_count..]),
        };
        block
            .binary_search_by(|c| c.as_str().cmp(code))
            .map(|position| self.code_to_pheindex[base + position])
            .map_err(|_| PheError::UnknownCode {
                era,
                code: code.to_string(),
            })
    }

    /// Returns the phecode at an index.
    pub fn phecode(&self, index: PheIndex) -> Option<&str> {
        self.phecodes.get(index).map(String::as_str)
    }

    /// Returns the sorted phecode universe.
    pub fn phecodes(&self) -> &[Phecode] {
        &self.phecodes
    }

    /// Returns the number of phecodes.
    pub fn len(&self) -> usize {
        self.phecodes.len()
    }

    /// Returns true if the vocabulary has no phecodes.
    pub fn is_empty(&self) -> bool {
        self.phecodes.is_empty()
    }

    /// Returns the number of mapped ICD-9 codes.
    pub fn icd9_count(&self) -> usize {
        self.icd9_count
    }

    /// Returns the number of mapped ICD-10 codes.
    pub fn icd10_count(&self) -> usize {
        self.codes.len() - self.icd9_count
    }

    /// Returns the total number of mapped ICD codes.
    pub fn code_count(&self) -> usize {
        self.codes.len()
    }
}
