//! Common utilities shared by the library and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Convert a `*` glob into an anchored regular expression
///
/// Only `*` is special; everything else matches literally.
pub fn glob_to_regex(pattern: &str) -> Result<regex::Regex> {
    let escaped = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    regex::Regex::new(&format!("^{escaped}$"))
        .map_err(|e| Error::InvalidArgument(format!("bad pattern '{pattern}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_matches_wildcards() {
        let re = glob_to_regex("*Memory*").unwrap();
        assert!(re.is_match("System Memory Usage"));
        assert!(re.is_match("Memory"));
        assert!(!re.is_match("Scheduler"));
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        let re = glob_to_regex("a.b(c)").unwrap();
        assert!(re.is_match("a.b(c)"));
        assert!(!re.is_match("axb(c)"));
    }
}
