// autocommit-core/src/git/normalize.rs

//! Rewrites `--flag value` pairs into `--flag=value` for options git only
//! accepts in the joined form.

use std::collections::HashSet;

/// Long options (without the leading `--`) merged with their value.
pub const DEFAULT_VALUE_FLAGS: &[&str] = &[
    "unified",
    "format",
    "pretty",
    "date",
    "color",
    "abbrev",
    "depth",
    "since",
    "until",
    "after",
    "before",
    "author",
    "committer",
    "grep",
    "max-count",
    "diff-filter",
];

#[derive(Debug, Clone)]
pub struct SyntaxNormalizer {
    value_flags: HashSet<String>,
}

impl Default for SyntaxNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_FLAGS.iter().copied())
    }
}

impl SyntaxNormalizer {
    pub fn new<I, S>(value_flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value_flags: value_flags.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the corrected argument list. Output of this function is a
    /// fixed point: running it again changes nothing.
    pub fn normalize(&self, args: &[String]) -> Vec<String> {
        let mut normalized = Vec::with_capacity(args.len());
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            let mergeable = arg
                .strip_prefix("--")
                .is_some_and(|name| self.value_flags.contains(name));

            match args.get(i + 1) {
                Some(value) if mergeable && !value.starts_with('-') => {
                    normalized.push(format!("{}={}", arg, value));
                    i += 2;
                }
                _ => {
                    normalized.push(arg.clone());
                    i += 1;
                }
            }
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merges_known_flag_with_value() {
        let normalizer = SyntaxNormalizer::default();
        assert_eq!(
            normalizer.normalize(&strings(&["--unified", "3"])),
            strings(&["--unified=3"])
        );
        assert_eq!(
            normalizer.normalize(&strings(&["-1", "--pretty", "oneline", "--author", "Ann", "HEAD"])),
            strings(&["-1", "--pretty=oneline", "--author=Ann", "HEAD"])
        );
    }

    #[test]
    fn test_unknown_flag_passes_through() {
        let normalizer = SyntaxNormalizer::default();
        let args = strings(&["--stat", "HEAD~1"]);
        assert_eq!(normalizer.normalize(&args), args);
    }

    #[test]
    fn test_flag_followed_by_flag_is_not_merged() {
        let normalizer = SyntaxNormalizer::default();
        let args = strings(&["--color", "--stat"]);
        assert_eq!(normalizer.normalize(&args), args);
    }

    #[test]
    fn test_trailing_flag_without_value_is_kept() {
        let normalizer = SyntaxNormalizer::default();
        let args = strings(&["--cached", "--unified"]);
        assert_eq!(normalizer.normalize(&args), args);
    }

    #[test]
    fn test_short_flags_are_never_merged() {
        let normalizer = SyntaxNormalizer::default();
        let args = strings(&["-U", "3"]);
        assert_eq!(normalizer.normalize(&args), args);
    }

    #[test]
    fn test_idempotent() {
        let normalizer = SyntaxNormalizer::default();
        let once = normalizer.normalize(&strings(&["--since", "yesterday", "--format", "%H", "--", "src"]));
        assert_eq!(once, strings(&["--since=yesterday", "--format=%H", "--", "src"]));
        assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn test_custom_flag_list() {
        let normalizer = SyntaxNormalizer::new(["word-diff"]);
        assert_eq!(
            normalizer.normalize(&strings(&["--word-diff", "color", "--unified", "1"])),
            strings(&["--word-diff=color", "--unified", "1"])
        );
    }

    #[test]
    fn test_empty_args() {
        assert!(SyntaxNormalizer::default().normalize(&[]).is_empty());
    }
}
