//! Version marker parsing and in-place rewriting.
//!
//! A marker is a single line assigning a quoted string to a fixed identifier:
//!
//! ```text
//! __version__ = '3f9a1c02be'
//! ```
//!
//! It is recognized by `^<ident>\s*=\s*['"][^'"]*['"]` in multiline mode, so
//! it must start at the beginning of a line. Rewriting replaces only the first
//! match with `<ident> = '<value>'`, or prepends that line when the file has
//! no marker. Nothing else in the file changes.

use crate::constants::DEFAULT_MARKER_IDENT;
use crate::core::SyncError;
use crate::utils::fs::atomic_write;
use regex::{NoExpand, Regex};
use std::path::Path;
use tracing::debug;

/// A compiled marker pattern for one identifier.
#[derive(Debug, Clone)]
pub struct MarkerPattern {
    ident: String,
    regex: Regex,
}

impl Default for MarkerPattern {
    fn default() -> Self {
        Self::compile(DEFAULT_MARKER_IDENT)
    }
}

impl MarkerPattern {
    /// Build a pattern for `ident`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidIdentifier`] unless `ident` is a non-empty
    /// run of ASCII letters, digits, and underscores not starting with a digit.
    pub fn new(ident: &str) -> Result<Self, SyncError> {
        let valid = ident.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid {
            return Err(SyncError::InvalidIdentifier {
                ident: ident.to_string(),
            });
        }

        Ok(Self::compile(ident))
    }

    fn compile(ident: &str) -> Self {
        let pattern = format!(r#"(?m)^{}\s*=\s*['"]([^'"]*)['"]"#, regex::escape(ident));
        let regex = Regex::new(&pattern).expect("escaped identifier forms a valid pattern");

        Self {
            ident: ident.to_string(),
            regex,
        }
    }

    /// The identifier this pattern matches.
    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// The canonical marker line for `value`, without a trailing newline.
    #[must_use]
    pub fn render(&self, value: &str) -> String {
        format!("{} = '{}'", self.ident, value)
    }

    /// The value of the first marker in `text`.
    #[must_use]
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    /// `text` with its marker set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidMarker`] if `value` contains a quote or a
    /// line break.
    pub fn apply(&self, text: &str, value: &str) -> Result<String, SyncError> {
        validate_value(value)?;
        let line = self.render(value);

        if self.regex.is_match(text) {
            Ok(self.regex.replacen(text, 1, NoExpand(&line)).into_owned())
        } else {
            Ok(format!("{line}\n{text}"))
        }
    }

    /// Rewrite the marker in the file at `path`.
    ///
    /// The new text goes to `<path>.tmp` first and is then renamed over the
    /// original.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidMarker`] for a bad value and
    /// [`SyncError::LocalIo`] if reading or writing fails; the original file
    /// is untouched in both cases.
    pub fn rewrite_file(&self, path: &Path, value: &str) -> Result<(), SyncError> {
        let text = std::fs::read_to_string(path).map_err(|e| SyncError::local_io("read", path, e))?;
        let updated = self.apply(&text, value)?;

        debug!(path = %path.display(), value, "Rewriting version marker");
        atomic_write(path, updated.as_bytes())
    }

    /// The current marker value in the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LocalIo`] if the file cannot be read as UTF-8.
    pub fn read_file(&self, path: &Path) -> Result<Option<String>, SyncError> {
        let text = std::fs::read_to_string(path).map_err(|e| SyncError::local_io("read", path, e))?;
        Ok(self.find(&text).map(str::to_string))
    }
}

fn validate_value(value: &str) -> Result<(), SyncError> {
    if value.contains(['\'', '"', '\n', '\r']) {
        return Err(SyncError::InvalidMarker {
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SOURCE: &str = "import os\n\n# in-file version marker\n__version__ = '0.0.0'\n\nprint(__version__)\n";

    #[test]
    fn test_replace_existing_marker_only_touches_that_line() {
        let marker = MarkerPattern::default();
        let updated = marker.apply(SOURCE, "3f9a1c02be").unwrap();

        let before: Vec<&str> = SOURCE.lines().collect();
        let after: Vec<&str> = updated.lines().collect();
        assert_eq!(before.len(), after.len());
        for (i, (b, a)) in before.iter().zip(&after).enumerate() {
            if i == 3 {
                assert_eq!(*a, "__version__ = '3f9a1c02be'");
            } else {
                assert_eq!(b, a);
            }
        }
        assert!(updated.ends_with('\n'));
    }

    #[test]
    fn test_prepend_when_missing() {
        let marker = MarkerPattern::default();
        let text = "print('no marker here')\n";
        let updated = marker.apply(text, "abc").unwrap();
        assert_eq!(updated, format!("__version__ = 'abc'\n{text}"));
    }

    #[test]
    fn test_indented_or_inline_assignment_is_not_a_marker() {
        let marker = MarkerPattern::default();
        let text = "def f():\n    __version__ = 'inner'\nx = __version__ = 'y'\n";
        assert_eq!(marker.find(text), None);

        let updated = marker.apply(text, "v1").unwrap();
        assert!(updated.starts_with("__version__ = 'v1'\n"));
        assert!(updated.ends_with(text));
    }

    #[test]
    fn test_accepts_double_quotes_and_spacing() {
        let marker = MarkerPattern::default();
        let text = "a = 1\n__version__=\"old\"  # trailing comment\n";
        assert_eq!(marker.find(text), Some("old"));
        assert_eq!(
            marker.apply(text, "new").unwrap(),
            "a = 1\n__version__ = 'new'  # trailing comment\n"
        );
    }

    #[test]
    fn test_only_first_marker_replaced() {
        let marker = MarkerPattern::default();
        let text = "__version__ = 'one'\n__version__ = 'two'\n";
        assert_eq!(marker.apply(text, "x").unwrap(), "__version__ = 'x'\n__version__ = 'two'\n");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let marker = MarkerPattern::default();
        for text in [SOURCE, "no marker\n", ""] {
            let once = marker.apply(text, "deadbeef00").unwrap();
            let twice = marker.apply(&once, "deadbeef00").unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_replacement_value_is_literal() {
        let marker = MarkerPattern::default();
        let updated = marker.apply(SOURCE, "$1${0}").unwrap();
        assert_eq!(marker.find(&updated), Some("$1${0}"));
    }

    #[test]
    fn test_rejects_values_that_break_quoting() {
        let marker = MarkerPattern::default();
        for value in ["a'b", "a\"b", "a\nb", "a\rb"] {
            let err = marker.apply(SOURCE, value).unwrap_err();
            assert!(matches!(err, SyncError::InvalidMarker { .. }));
        }
    }

    #[test]
    fn test_custom_identifier() {
        let marker = MarkerPattern::new("BUILD_ID").unwrap();
        assert_eq!(marker.ident(), "BUILD_ID");
        let text = "BUILD_ID = 'x'\n__version__ = 'y'\n";
        assert_eq!(marker.apply(text, "z").unwrap(), "BUILD_ID = 'z'\n__version__ = 'y'\n");
    }

    #[test]
    fn test_invalid_identifiers() {
        for ident in ["", "1abc", "a-b", "a b", "a.*"] {
            assert!(matches!(
                MarkerPattern::new(ident),
                Err(SyncError::InvalidIdentifier { .. })
            ));
        }
    }

    #[test]
    fn test_rewrite_file_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("app.py");
        std::fs::write(&path, SOURCE).unwrap();

        let marker = MarkerPattern::default();
        marker.rewrite_file(&path, "1234567890").unwrap();

        assert_eq!(marker.read_file(&path).unwrap().as_deref(), Some("1234567890"));
        assert!(!temp.path().join("app.py.tmp").exists());
    }

    #[test]
    fn test_rewrite_missing_file_fails_without_creating_it() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent.py");

        let err = MarkerPattern::default().rewrite_file(&path, "abc").unwrap_err();
        assert!(matches!(err, SyncError::LocalIo { .. }));
        assert!(!path.exists());
    }
}
