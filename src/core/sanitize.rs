//! Terminal escape stripping for model output.

use regex::Regex;
use std::sync::LazyLock;

/// CSI sequence: ESC `[`, parameter bytes, intermediate bytes, one final byte.
static ANSI_CSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("valid CSI pattern"));

/// Removes every ANSI CSI escape sequence from `text`, keeping all other characters in order.
///
/// Removal repeats until nothing matches, so a sequence that only forms once an inner one is
/// cut out (`ESC [ ESC [31m 1m`) is removed as well and the result is a fixed point.
pub fn strip_ansi(text: &str) -> String {
    let mut current = text.to_owned();
    while ANSI_CSI.is_match(&current) {
        current = ANSI_CSI.replace_all(&current, "").into_owned();
    }
    current
}
