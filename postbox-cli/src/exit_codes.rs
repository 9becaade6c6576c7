//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (malformed records, unknown sort key or map mode).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Service unavailable (server unreachable or failing).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Permission denied (wrong admin password).
/// Maps to EX_NOPERM from sysexits.h.
pub const AUTH_ERROR: i32 = 77;

/// Text appended to `--help`.
pub const HELP_TEXT: &str = "\
Exit codes:
  0   Success
  1   General error
  65  Data error (malformed records, unknown sort key or map mode)
  66  Cannot read input file
  69  Server unavailable
  74  Cannot write output file
  77  Rejected by server (wrong password)";

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify error by inspecting the chain
        let code = if message.contains("Failed to read file") {
            INPUT_ERROR
        } else if message.contains("Unauthorized") {
            AUTH_ERROR
        } else if message.contains("Failed to parse")
            || message.contains("Invalid sort key")
            || message.contains("Invalid map mode")
            || message.contains("Invalid card type")
            || message.contains("Invalid geo config")
        {
            DATA_ERROR
        } else if message.contains("Request failed") || message.contains("Server error") {
            NETWORK_ERROR
        } else if message.contains("Failed to write") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_classification() {
        let cases = [
            (anyhow!("Failed to read file: cards.json"), INPUT_ERROR),
            (anyhow!("Invalid sort key: newest"), DATA_ERROR),
            (anyhow!("Unauthorized: Invalid password"), AUTH_ERROR),
            (anyhow!("Request failed: connection refused"), NETWORK_ERROR),
            (anyhow!("Failed to write list.json"), IO_ERROR),
            (anyhow!("something else"), GENERAL_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ExitCode::from_anyhow(&err).code, expected, "{err:#}");
        }
    }

    #[test]
    fn test_success_has_no_message() {
        let exit = ExitCode::success();
        assert_eq!(exit.code, SUCCESS);
        assert!(exit.message.is_none());
    }
}
