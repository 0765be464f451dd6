//! Region eligibility rules
//!
//! A mapping survives enumeration only if it passes, in order: the built-in
//! substring exclusions, the caller's include patterns, the handle's glob
//! blacklist and the permission checks.

use crate::config::DEFAULT_EXCLUSIONS;
use crate::core::types::{MemoryError, MemoryRegion, MemoryResult};
use regex::Regex;
use tracing::debug;

/// Handle-scoped exclusion settings
#[derive(Debug, Clone)]
pub struct RegionFilter {
    /// Substrings matched against the raw map line
    default_exclusions: Vec<String>,
    /// Shell-style globs matched against the whole backing path
    exclude_patterns: Vec<String>,
    /// `exclude_patterns` compiled, in the same order
    compiled: Vec<Regex>,
}

impl RegionFilter {
    /// Builds a filter, rejecting any blacklist glob that does not compile
    pub fn new(default_exclusions: Vec<String>, exclude_patterns: Vec<String>) -> MemoryResult<Self> {
        let compiled = compile_globs(&exclude_patterns)?;
        Ok(RegionFilter {
            default_exclusions,
            exclude_patterns,
            compiled,
        })
    }

    /// No exclusions at all, not even the built-in ones
    pub fn permissive() -> Self {
        RegionFilter {
            default_exclusions: Vec::new(),
            exclude_patterns: Vec::new(),
            compiled: Vec::new(),
        }
    }

    pub fn default_exclusions(&self) -> &[String] {
        &self.default_exclusions
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Replaces the glob blacklist for all later enumerations
    ///
    /// On error the previous blacklist stays in place.
    pub fn set_exclude_patterns(&mut self, patterns: Vec<String>) -> MemoryResult<()> {
        self.compiled = compile_globs(&patterns)?;
        self.exclude_patterns = patterns;
        Ok(())
    }

    /// Replaces the built-in substring exclusions
    pub fn set_default_exclusions(&mut self, exclusions: Vec<String>) {
        self.default_exclusions = exclusions;
    }

    /// True if the raw line mentions a known-problematic mapping
    pub fn is_builtin_excluded(&self, line: &str) -> bool {
        self.default_exclusions
            .iter()
            .any(|needle| line.contains(needle.as_str()))
    }

    /// True if the path matches any blacklist glob
    pub fn is_blacklisted(&self, path: &str) -> bool {
        self.compiled.iter().any(|glob| glob.is_match(path))
    }

    /// Applies the include, blacklist and permission rules to a parsed region
    pub fn admits(
        &self,
        region: &MemoryRegion,
        writable_only: bool,
        include: &IncludePatterns,
    ) -> bool {
        if !include.is_empty() && !include.matches(&region.path) {
            return false;
        }

        if self.is_blacklisted(&region.path) {
            return false;
        }

        if !region.permissions.read {
            return false;
        }

        !(writable_only && !region.permissions.write)
    }
}

impl Default for RegionFilter {
    fn default() -> Self {
        RegionFilter {
            default_exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            ..RegionFilter::permissive()
        }
    }
}

fn compile_globs(patterns: &[String]) -> MemoryResult<Vec<Regex>> {
    patterns.iter().map(|p| compile_glob(p)).collect()
}

/// Compiles a shell-style glob that must match the whole path
fn compile_glob(pattern: &str) -> MemoryResult<Regex> {
    Regex::new(&glob_to_regex(pattern)).map_err(|err| MemoryError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}

/// Translates a glob into an anchored regex
///
/// `*` matches any run of characters including `/`, `?` matches exactly one,
/// `[seq]` and `[!seq]` are character classes. A `[` without a closing `]`
/// is literal.
fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("\\[");
                    continue;
                }

                let body = &chars[i..j];
                i = j + 1;
                out.push('[');
                for (k, &b) in body.iter().enumerate() {
                    match b {
                        '!' if k == 0 => out.push('^'),
                        '^' if k == 0 => out.push_str("\\^"),
                        // class syntax the regex engine would otherwise interpret
                        '\\' | '[' | '&' | '~' => {
                            out.push('\\');
                            out.push(b);
                        }
                        _ => out.push(b),
                    }
                }
                out.push(']');
            }
            _ => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
    }

    out.push('$');
    out
}

/// One caller-supplied path pattern, usable as a regex or as literal text
#[derive(Debug, Clone)]
struct IncludePattern {
    literal: String,
    regex: Option<Regex>,
}

impl IncludePattern {
    fn new(pattern: &str) -> Self {
        // Anchored at the start of the path, like a prefix match
        let regex = match Regex::new(&format!("^(?:{})", pattern)) {
            Ok(regex) => Some(regex),
            Err(err) => {
                debug!(pattern, error = %err, "include pattern is not a regex, matching literally");
                None
            }
        };
        IncludePattern {
            literal: pattern.to_string(),
            regex,
        }
    }

    fn matches(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(path)) || path.starts_with(&self.literal)
    }
}

/// Path patterns a region must match to be kept
///
/// Each pattern is tried both as a regular expression and as escaped literal
/// text, both anchored at the start of the path, so plain path prefixes such
/// as `/usr/lib/libc.so.6` work as well as real expressions.
#[derive(Debug, Clone, Default)]
pub struct IncludePatterns {
    patterns: Vec<IncludePattern>,
}

impl IncludePatterns {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        IncludePatterns {
            patterns: patterns
                .iter()
                .map(|p| IncludePattern::new(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if the path matches at least one pattern
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}
