//! Output helpers shared by CLI subcommands.
//!
//! Global flags (--json, --quiet, --verbose, --no-color) are exported as
//! TAGPROBE_* environment variables by main so every module can check them
//! without threading a config value through.

/// Whether --json was passed.
pub fn is_json() -> bool {
    env_flag("TAGPROBE_JSON")
}

/// Whether --quiet was passed.
pub fn is_quiet() -> bool {
    env_flag("TAGPROBE_QUIET")
}

/// Whether --verbose was passed.
pub fn is_verbose() -> bool {
    env_flag("TAGPROBE_VERBOSE")
}

/// Whether --no-color was passed.
pub fn no_color() -> bool {
    env_flag("TAGPROBE_NO_COLOR")
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(false)
}

/// Print a value as pretty JSON to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to serialize JSON output: {e}"),
    }
}
