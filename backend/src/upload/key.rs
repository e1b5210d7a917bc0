//! Object key generation

use chrono::{DateTime, Utc};

/// How an object key is derived from the upload time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// `<epoch-ms>.<extension>`, where the extension is whatever follows the
    /// last `.` of the original name (or the whole name if it has no dot)
    TimestampWithExtension,
    /// `<epoch-ms>`
    Timestamp,
}

impl KeyPolicy {
    /// Key for a file named `original_file_name` uploaded at `now`
    ///
    /// Keys only have millisecond resolution, so two uploads in the same
    /// millisecond get the same key and the later one overwrites.
    #[must_use]
    pub fn object_key(&self, original_file_name: &str, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();

        match self {
            Self::TimestampWithExtension => {
                let extension = original_file_name
                    .rsplit('.')
                    .next()
                    .unwrap_or(original_file_name);
                format!("{millis}.{extension}")
            }
            Self::Timestamp => millis.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_timestamp_with_extension() {
        let policy = KeyPolicy::TimestampWithExtension;
        assert_eq!(policy.object_key("photo.png", at(1_700_000_000_123)), "1700000000123.png");
        assert_eq!(
            policy.object_key("archive.tar.gz", at(1_700_000_000_123)),
            "1700000000123.gz"
        );
    }

    #[test]
    fn test_name_without_dot_becomes_extension() {
        let policy = KeyPolicy::TimestampWithExtension;
        assert_eq!(policy.object_key("README", at(42)), "42.README");
        assert_eq!(policy.object_key("trailing.", at(42)), "42.");
    }

    #[test]
    fn test_bare_timestamp() {
        assert_eq!(
            KeyPolicy::Timestamp.object_key("photo.png", at(1_700_000_000_123)),
            "1700000000123"
        );
    }

    #[test]
    fn test_same_millisecond_collides() {
        let now = at(1_700_000_000_000);
        assert_eq!(
            KeyPolicy::Timestamp.object_key("a.png", now),
            KeyPolicy::Timestamp.object_key("b.jpg", now)
        );
    }
}
