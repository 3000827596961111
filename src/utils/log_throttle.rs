//! Rate limiting for warnings emitted from the recording hot path.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    suppressed: u64,
}

static WINDOWS: OnceLock<Mutex<HashMap<&'static str, Window>>> = OnceLock::new();

fn windows() -> &'static Mutex<HashMap<&'static str, Window>> {
    WINDOWS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns `Some(suppressed_count)` when a log for `key` should be emitted,
/// otherwise `None` and the event is counted as suppressed for the active window.
///
/// Never panics, so it is safe to call from code that must not fail.
pub fn should_emit(key: &'static str, interval: Duration) -> Option<u64> {
    let mut map = windows().lock().unwrap_or_else(PoisonError::into_inner);
    let now = Instant::now();

    match map.get_mut(key) {
        Some(window) if now.duration_since(window.started_at) >= interval => {
            let suppressed = window.suppressed;
            window.started_at = now;
            window.suppressed = 0;
            Some(suppressed)
        }
        Some(window) => {
            window.suppressed += 1;
            None
        }
        None => {
            map.insert(
                key,
                Window {
                    started_at: now,
                    suppressed: 0,
                },
            );
            Some(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::should_emit;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_first_emit_then_suppress_then_report_count() {
        let key = "test.log_throttle.first_emit_then_suppress";
        let interval = Duration::from_millis(20);

        assert_eq!(should_emit(key, interval), Some(0));
        assert_eq!(should_emit(key, interval), None);
        assert_eq!(should_emit(key, interval), None);

        sleep(Duration::from_millis(30));
        assert_eq!(should_emit(key, interval), Some(2));
        assert_eq!(should_emit(key, interval), None);
    }

    #[test]
    fn test_keys_are_independent() {
        let interval = Duration::from_secs(60);
        assert_eq!(should_emit("test.log_throttle.key_a", interval), Some(0));
        assert_eq!(should_emit("test.log_throttle.key_b", interval), Some(0));
        assert_eq!(should_emit("test.log_throttle.key_a", interval), None);
    }
}
