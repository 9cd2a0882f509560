//! ProGuard-style name filters.
//!
//! A filter is an ordered list of glob patterns. `?` matches one character
//! other than the separator, `*` any run of characters other than the
//! separator and `**` any run including separators. A leading `!` negates the
//! pattern. The first matching pattern decides; when none matches, the name is
//! accepted only if the last pattern is negated. An empty filter accepts
//! everything.

use regex::Regex;

use crate::error::{Result, ShrinkError};

/// Accepts compiled classes only.
pub const CLASS_FILTER: &str = "**.class";
/// Rejects compiled classes.
pub const NOT_CLASS_FILTER: &str = "!**.class";
/// Prepended to every reference-only input.
pub const REFERENCE_BASE_FILTER: &[&str] = &["!META-INF/MANIFEST.MF"];

/// Separator for archive entry names.
pub const PATH_SEPARATOR: char = '/';
/// Separator for class-name patterns in keep rules.
pub const CLASS_SEPARATOR: char = '.';

#[derive(Debug, Clone)]
struct Pattern {
    negated: bool,
    regex: Regex,
}

/// A filter ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    patterns: Vec<Pattern>,
}

impl CompiledFilter {
    /// Compile a file filter (separator `/`).
    pub fn files<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        Self::compile(patterns, PATH_SEPARATOR)
    }

    /// Compile a class-name filter (separator `.`).
    pub fn classes<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        Self::compile(patterns, CLASS_SEPARATOR)
    }

    pub fn compile<S: AsRef<str>>(patterns: &[S], separator: char) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                let raw = raw.as_ref().trim();
                let (negated, glob) = match raw.strip_prefix('!') {
                    Some(rest) => (true, rest),
                    None => (false, raw),
                };
                let regex = Regex::new(&glob_to_regex(glob, separator)).map_err(|e| {
                    ShrinkError::InvalidFilter { pattern: raw.to_string(), reason: e.to_string() }
                })?;
                Ok(Pattern { negated, regex })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn accepts(&self, name: &str) -> bool {
        for pattern in &self.patterns {
            if pattern.regex.is_match(name) {
                return !pattern.negated;
            }
        }
        self.patterns.last().map_or(true, |p| p.negated)
    }
}

/// Translate one glob into an anchored regular expression.
pub fn glob_to_regex(glob: &str, separator: char) -> String {
    let sep = regex::escape(&separator.to_string());
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str(&format!("[^{sep}]*")),
            '?' => out.push_str(&format!("[^{sep}]")),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

/// Filter derived from declared content kinds, on top of `base`.
///
/// Without classes the base is extended with `!**.class`; without resources
/// the filter is replaced by `**.class`; otherwise `base` is returned as is.
pub fn kind_filter(base: &[String], has_classes: bool, has_resources: bool) -> Vec<String> {
    if !has_classes {
        let mut filter = base.to_vec();
        filter.push(NOT_CLASS_FILTER.to_string());
        filter
    } else if !has_resources {
        vec![CLASS_FILTER.to_string()]
    } else {
        base.to_vec()
    }
}

pub fn reference_base_filter() -> Vec<String> {
    REFERENCE_BASE_FILTER.iter().map(|s| s.to_string()).collect()
}
