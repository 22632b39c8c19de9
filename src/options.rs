//! Analysis options configuration.

/// Files above this size get a `FileSize` warning (100 MiB).
pub const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Tracked change count at which the finding becomes an error.
///
/// Policy value, not a structural limit of the format.
pub const TRACKED_CHANGES_ERROR_THRESHOLD: usize = 100;

/// Number of per-occurrence invalid character details in verbose mode.
pub const MAX_CHARACTER_DETAILS: usize = 5;

/// Options for analyzing a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Emit per-occurrence detail issues
    pub verbose: bool,

    /// Maximum number of `InvalidCharacterDetail` issues in verbose mode
    pub max_character_details: usize,

    /// Size in bytes above which a `FileSize` warning is raised
    pub large_file_threshold: u64,

    /// Tracked change total at which severity escalates to error
    pub tracked_changes_error_threshold: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            max_character_details: MAX_CHARACTER_DETAILS,
            large_file_threshold: LARGE_FILE_THRESHOLD,
            tracked_changes_error_threshold: TRACKED_CHANGES_ERROR_THRESHOLD,
        }
    }
}

impl AnalyzeOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable verbose detail issues.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the number of detail issues emitted in verbose mode.
    pub fn with_max_character_details(mut self, max: usize) -> Self {
        self.max_character_details = max;
        self
    }

    /// Set the large file warning threshold in bytes.
    pub fn with_large_file_threshold(mut self, bytes: u64) -> Self {
        self.large_file_threshold = bytes;
        self
    }

    /// Set the tracked change error threshold.
    pub fn with_tracked_changes_error_threshold(mut self, threshold: usize) -> Self {
        self.tracked_changes_error_threshold = threshold;
        self
    }
}
