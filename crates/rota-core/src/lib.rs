//! Foundational low-level utilities shared across rota crates.
//!
//! Provides unix-time helpers and durable file-write primitives used by the
//! gateway runtime state, outcome logs, and dead-letter persistence.

pub mod file_io;
pub mod time_utils;

pub use file_io::{append_jsonl_line, write_text_atomic};
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms, format_unix_ms_rfc3339};

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use super::*;

    #[test]
    fn timestamp_units_agree() {
        let seconds = current_unix_timestamp();
        let millis = current_unix_timestamp_ms();
        let millis_as_seconds = millis / 1_000;
        assert!(millis_as_seconds >= seconds);
        assert!(millis_as_seconds <= seconds.saturating_add(1));
    }

    #[test]
    fn rfc3339_rendering_is_stable() {
        assert_eq!(format_unix_ms_rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_unix_ms_rfc3339(1_700_000_000_000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn atomic_write_then_append_round_trip() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("state/outcomes.jsonl");
        write_text_atomic(&path, "{\"a\":1}\n").expect("write");
        append_jsonl_line(&path, "{\"b\":2}").expect("append");
        let contents = read_to_string(&path).expect("read");
        assert_eq!(contents, "{\"a\":1}\n{\"b\":2}\n");
    }
}
