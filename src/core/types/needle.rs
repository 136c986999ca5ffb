//! Named search patterns and the `label --- pattern` input format

use super::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};

/// Field delimiter in the free-form needle input format
pub const NEEDLE_DELIMITER: &str = "---";

/// A named byte pattern to search for in process memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Needle {
    /// Caller-chosen name reported back with every match
    pub label: String,
    /// Raw bytes to search for, matched exactly with no encoding assumptions
    pub pattern: Vec<u8>,
}

impl Needle {
    /// Creates a needle, rejecting empty labels and empty patterns
    pub fn new(label: impl Into<String>, pattern: impl Into<Vec<u8>>) -> ScanResult<Self> {
        let label = label.into();
        let pattern = pattern.into();

        if label.is_empty() {
            return Err(ScanError::invalid_argument("needle label must not be empty"));
        }
        if pattern.is_empty() {
            return Err(ScanError::invalid_argument(format!(
                "needle {label:?} has an empty pattern"
            )));
        }

        Ok(Needle { label, pattern })
    }

    /// Pattern rendered for humans: UTF-8 when it is, hex otherwise
    pub fn pattern_display(&self) -> String {
        match std::str::from_utf8(&self.pattern) {
            Ok(s) => s.to_string(),
            Err(_) => format!("hex:{}", hex::encode(&self.pattern)),
        }
    }

    /// Parses the free-form multi-line needle format.
    ///
    /// One needle per line, two fields separated by `---`, whitespace trimmed
    /// from both. Blank lines are ignored. A line missing either field is a
    /// per-line format error and rejects the whole set before any scan I/O.
    pub fn parse_lines(text: &str) -> ScanResult<Vec<Needle>> {
        let mut needles = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let Some((label, pattern)) = line.split_once(NEEDLE_DELIMITER) else {
                return Err(ScanError::malformed_needle_line(index + 1, raw));
            };

            let label = label.trim();
            let pattern = pattern.trim();
            if label.is_empty() || pattern.is_empty() {
                return Err(ScanError::malformed_needle_line(index + 1, raw));
            }

            needles.push(Needle::new(label, pattern.as_bytes())?);
        }

        Ok(needles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needle_validation() {
        let needle = Needle::new("greeting", b"WORLD".to_vec()).unwrap();
        assert_eq!(needle.label, "greeting");
        assert_eq!(needle.pattern, b"WORLD");

        assert!(Needle::new("", b"x".to_vec()).is_err());
        assert!(Needle::new("empty", Vec::new()).is_err());
    }

    #[test]
    fn test_parse_lines() {
        let text = "greeting --- WORLD\n\n  token ---   secret value  \n";
        let needles = Needle::parse_lines(text).unwrap();
        assert_eq!(needles.len(), 2);
        assert_eq!(needles[0].label, "greeting");
        assert_eq!(needles[0].pattern, b"WORLD");
        assert_eq!(needles[1].label, "token");
        assert_eq!(needles[1].pattern, b"secret value");
    }

    #[test]
    fn test_parse_lines_reports_line_number() {
        let text = "ok --- fine\nmissing delimiter\n";
        match Needle::parse_lines(text) {
            Err(ScanError::MalformedNeedleLine { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "missing delimiter");
            }
            other => panic!("expected malformed line error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_lines_rejects_empty_field() {
        assert!(Needle::parse_lines("label --- ").is_err());
        assert!(Needle::parse_lines(" --- pattern").is_err());
    }

    #[test]
    fn test_parse_lines_empty_input() {
        assert!(Needle::parse_lines("").unwrap().is_empty());
        assert!(Needle::parse_lines("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_pattern_display() {
        let text = Needle::new("t", b"plain".to_vec()).unwrap();
        assert_eq!(text.pattern_display(), "plain");

        let binary = Needle::new("b", vec![0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(binary.pattern_display(), "hex:deadbeef");
    }
}
