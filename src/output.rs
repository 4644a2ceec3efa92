//! Process-wide switch for decorative output.
//!
//! Decided once: the `--quiet` flag if the binary passes it to
//! [`init_quiet`], otherwise `ORUNMILA_QUIET`.

use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

const QUIET_ENV: &str = "ORUNMILA_QUIET";

fn parse_quiet(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
}

fn quiet_from_env() -> bool {
    parse_quiet(std::env::var(QUIET_ENV).ok().as_deref())
}

/// Fix the quiet flag for the rest of the process and return it.
///
/// Has no effect once the flag has been read.
pub fn init_quiet(flag: bool) -> bool {
    *QUIET.get_or_init(|| flag || quiet_from_env())
}

pub fn is_quiet() -> bool {
    *QUIET.get_or_init(quiet_from_env)
}
