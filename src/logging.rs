//! Logging bootstrap for the command-line tool.
//!
//! Library code only talks to the `log` facade. The binary installs a
//! `flexi_logger` backend writing to stderr so stdout stays reserved for
//! command output such as JSON lines.

use flexi_logger::{Logger, LoggerHandle};
use log::debug;

/// Level used when neither `RUST_LOG` nor `--verbose` asks for more.
const DEFAULT_LEVEL: &str = "warn";
/// Level used with `--verbose`.
const VERBOSE_LEVEL: &str = "debug";

/// Pick the fallback level spec for `flexi_logger`. `RUST_LOG` overrides it.
pub const fn level_spec(verbose: bool) -> &'static str {
    return if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL };
}

/// Start the stderr logger. The returned handle must live as long as logging
/// is needed.
///
/// # Errors
///
/// Returns a human-readable message if `RUST_LOG` is malformed or the
/// backend cannot start.
pub fn init(verbose: bool) -> Result<LoggerHandle, String> {
    let level = level_spec(verbose);
    let handle = Logger::try_with_env_or_str(level)
        .map_err(|err| return format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| return format!("failed to start logger: {err}"))?;

    debug!(
        "event=logging_init status=ok level={level} version={}",
        env!("CARGO_PKG_VERSION")
    );
    return Ok(handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_the_fallback_level() {
        assert_eq!(level_spec(false), "warn");
        assert_eq!(level_spec(true), "debug");
    }
}
