//! Exit code constants for the prompty CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, malformed or missing definition files)
//! - 2: Validation failure (input or schema type checks)
//! - 3: Plugin failure (unregistered selector or a failing stage)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable or malformed definitions, unresolved references.
pub const USER_ERROR: i32 = 1;

/// Validation failure: missing inputs or type mismatches.
pub const VALIDATION_FAILURE: i32 = 2;

/// Plugin failure: no plugin for a selector, or a stage returned an error.
pub const PLUGIN_FAILURE: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, VALIDATION_FAILURE, PLUGIN_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
