//! Exit status for remoctl

use remo_common::PollerError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for any fetch, parse, config or write failure
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code for a failed run
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PollerError>()
        .map(PollerError::exit_code)
        .unwrap_or(EXIT_GENERAL_ERROR)
}
