//! Configuration options for compile sessions.

/// Configuration of the emitter's resources.
///
/// # Example
///
/// ```
/// use nanoseed_core::api::EmitterOptions;
///
/// let options = EmitterOptions {
///     base_register: "r15".to_string(),
///     ..EmitterOptions::default()
/// };
/// assert_eq!(options.granularity, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterOptions {
    /// Register holding the address just past the scratch region. It is
    /// reserved for the whole session and never assigned.
    ///
    /// Default: `r14`
    pub base_register: String,

    /// Minimum size of any memory allocation, in bytes.
    ///
    /// Default: 8
    pub granularity: u64,

    /// Size of the scratch region below the base register, in bytes.
    ///
    /// Default: 1 MiB
    pub scratch_size: u64,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            base_register: "r14".to_string(),
            granularity: 8,
            scratch_size: 1 << 20,
        }
    }
}

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use nanoseed_core::api::CompileOptions;
///
/// let options = CompileOptions {
///     seed: Some(7),
///     ..CompileOptions::default()
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub emitter: EmitterOptions,

    /// Seed for the range solver's random source.
    ///
    /// `None` seeds from the operating system, so range constraints pick a
    /// different value on every run.
    pub seed: Option<u64>,
}
