//! Utility functions for segmetrics.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::OnceLock;

/// Global set of warned messages (for warn_once).
static WARNED_MESSAGES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Print a warning message only once.
///
/// Subsequent calls with the same message are ignored.
pub fn warn_once(message: &str) {
    let warned = WARNED_MESSAGES.get_or_init(|| Mutex::new(HashSet::new()));
    let mut guard = warned.lock().unwrap();
    if !guard.contains(message) {
        eprintln!("WARNING: {}", message);
        guard.insert(message.to_string());
    }
}
