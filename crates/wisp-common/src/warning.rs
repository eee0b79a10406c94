//! Parser warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the HTTP, HTML, and CSS components to report recoverable input
//! oddities. Anything that aborts a parse is returned as an error instead.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while holding the lock leaves the set usable.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record a warning key, returning `true` the first time it is seen.
fn record(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    warned().get_or_insert_with(HashSet::new).insert(key)
}

/// Warn about a recoverable input problem (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("HTML Tokenizer", "duplicate attribute 'class' on <div>");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(component, message) {
        eprintln!("{}", format!("[wisp {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (call when loading a new document)
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_messages_print_once() {
        let message = "repeated_messages_print_once";
        assert!(record("Test", message));
        assert!(!record("Test", message));
        warn_once("Test", message);
    }

    #[test]
    fn components_are_part_of_the_key() {
        let message = "components_are_part_of_the_key";
        assert!(record("Alpha", message));
        assert!(record("Beta", message));
    }
}
