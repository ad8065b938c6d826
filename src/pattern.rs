//! Chapter heading patterns.
//!
//! A [`PatternSet`] is an ordered list of regular expressions. Built-in
//! patterns come first; user patterns are appended after them, so a
//! built-in always wins when both match the same line.

use std::fmt;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// Built-in heading patterns, in precedence order.
const BUILTIN_PATTERNS: &[&str] = &[
    // 第一章 / 第12章
    r"^第[一二三四五六七八九十\d]+章",
    r"^Chapter\s+\d+",
    // "1. Introduction" (needs text after the number)
    r"^\d+\.\s+\S+",
    // 第3节
    r"^第\d+节",
    // 第二部分
    r"^第[一二三四五六七八九十\d]+部分",
    r"^Section\s+\d+",
];

fn builtin_regexes() -> &'static [Regex] {
    static BUILTINS: OnceLock<Vec<Regex>> = OnceLock::new();
    BUILTINS.get_or_init(|| {
        BUILTIN_PATTERNS
            .iter()
            .map(|p| compile(p).expect("built-in pattern must compile"))
            .collect()
    })
}

/// All patterns are case-insensitive.
fn compile(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Where a pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSource {
    /// Shipped with the library
    BuiltIn,
    /// Added through [`PatternSet::push`]
    User,
}

/// A compiled heading pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: PatternSource,
}

impl Pattern {
    /// The pattern's source text.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern is built in or user supplied.
    pub fn source(&self) -> PatternSource {
        self.source
    }

    /// Whether the pattern matches at the very start of `line`.
    pub fn matches_start(&self, line: &str) -> bool {
        self.regex.find(line).is_some_and(|m| m.start() == 0)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of heading patterns; first match wins.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Create a set holding only the built-in patterns.
    pub fn with_builtins() -> Self {
        let patterns = builtin_regexes()
            .iter()
            .map(|regex| Pattern {
                regex: regex.clone(),
                source: PatternSource::BuiltIn,
            })
            .collect();
        Self { patterns }
    }

    /// Create an empty set.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Append a user pattern after every existing pattern.
    ///
    /// The pattern is trimmed first. Blank or unparsable patterns are
    /// rejected and leave the set untouched.
    pub fn push(&mut self, pattern: &str) -> Result<()> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }

        let regex = compile(pattern).map_err(|e| Error::PatternInvalid {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        self.patterns.push(Pattern {
            regex,
            source: PatternSource::User,
        });
        Ok(())
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.push(pattern)?;
        Ok(self)
    }

    /// Return the first pattern matching the start of `line`.
    pub fn find(&self, line: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.matches_start(line))
    }

    /// Whether any pattern matches the start of `line`.
    pub fn matches(&self, line: &str) -> bool {
        self.find(line).is_some()
    }

    /// Iterate patterns in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::with_builtins()
    }
}
