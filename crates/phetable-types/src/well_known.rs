//! Well-known defaults.
//!
//! Column names and thresholds used when no override is configured.

/// Minimum effective count for a subject to be called a case.
pub const DEFAULT_MIN_COUNT: u32 = 2;

/// Minimum age at diagnosis for a record to count.
pub const DEFAULT_MIN_AGE: f64 = 18.0;

/// Age assumed for every record when the stream has no age column.
pub const MISSING_AGE_COLUMN_AGE: f64 = 100.0;

/// Age assumed for a record whose age value does not parse.
pub const INVALID_AGE: f64 = 0.0;

/// Default token for male subjects.
pub const DEFAULT_MALE_CODE: &str = "M";

/// Default token for female subjects.
pub const DEFAULT_FEMALE_CODE: &str = "F";

// ============================================================================
// Diagnosis stream columns
// ============================================================================

/// Default subject id column.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Default age column.
pub const DEFAULT_AGE_COLUMN: &str = "AGE_AT_ICD";

/// Default ICD code column.
pub const DEFAULT_CODE_COLUMN: &str = "ICD_CODE";

/// Default era flag column.
pub const DEFAULT_ERA_COLUMN: &str = "ICD_FLAG";

/// Default sex column in the demographics table.
pub const DEFAULT_SEX_COLUMN: &str = "SEX";

// ============================================================================
// Reference table columns
// ============================================================================

/// Translation table: raw ICD code.
pub const TRANSLATION_CODE_COLUMN: &str = "code";

/// Translation table: vocabulary id carrying the era token.
pub const TRANSLATION_VOCABULARY_COLUMN: &str = "vocabulary_id";

/// Translation table: target phecode.
pub const TRANSLATION_PHECODE_COLUMN: &str = "phecode";

/// Rollup table: child phecode.
pub const ROLLUP_CHILD_COLUMN: &str = "code";

/// Rollup table: parent phecode.
pub const ROLLUP_PARENT_COLUMN: &str = "phecode_unrolled";

/// Restriction table: phecode.
pub const RESTRICTION_PHECODE_COLUMN: &str = "phecode";

/// Restriction table: male-only flag.
pub const RESTRICTION_MALE_COLUMN: &str = "male_only";

/// Restriction table: female-only flag.
pub const RESTRICTION_FEMALE_COLUMN: &str = "female_only";

// ============================================================================
// Run settings
// ============================================================================

/// Diagnosis records between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000_000;

/// Subjects classified per batch during emission.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default output file prefix.
pub const DEFAULT_OUTPUT_PREFIX: &str = "phetable";
