//! CLI Exit Code Registry
//!
//! Single source of truth for `katilim` exit codes. Scripts and schedulers
//! rely on them, so codes are never reused.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Run completed (individual sources or artifacts may have failed; see the report) |
//! | 1    | General error (HTTP client setup, report serialization)   |
//! | 2    | CLI usage error (bad args)                                |
//! | 3    | Settings file unreadable or invalid                       |

/// Run completed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. clap exits with the same code on its own
/// parse failures.
pub const EXIT_USAGE: u8 = 2;

/// Settings could not be read, parsed or validated.
pub const EXIT_CONFIG: u8 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_CONFIG];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
