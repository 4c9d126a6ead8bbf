//! Rule sets: exact-match lookup tables and ordered regex rewrite rules.
//!
//! A [`RuleSource`] is the uncompiled form loaded from the command line or a
//! file. [`RuleSource::compile`] validates it into a [`RuleSet`], which is
//! immutable and can be applied to any number of values.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::warn;

use crate::error::RuleError;

/// Separator between pattern and replacement in `PATTERN::REPLACEMENT`.
pub const PATTERN_SEPARATOR: &str = "::";

/// Options shared by all rule kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOptions {
    /// Compare lookup keys and match patterns without regard to case.
    pub case_insensitive: bool,
}

impl RuleOptions {
    #[must_use]
    pub fn case_insensitive(mut self, enable: bool) -> Self {
        self.case_insensitive = enable;
        self
    }
}

/// An uncompiled `(pattern, replacement)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl PatternSpec {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Parse `PATTERN::REPLACEMENT`, splitting on the first separator.
    ///
    /// The replacement may be empty (`\s+::` deletes whitespace).
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let Some((pattern, replacement)) = raw.split_once(PATTERN_SEPARATOR) else {
            return Err(RuleError::MissingSeparator {
                raw: raw.to_string(),
            });
        };
        if pattern.is_empty() {
            return Err(RuleError::EmptyPattern {
                raw: raw.to_string(),
            });
        }
        Ok(Self::new(pattern, replacement))
    }
}

impl FromStr for PatternSpec {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The uncompiled rule set, as read from the command line or a rule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Lookup(BTreeMap<String, String>),
    Patterns(Vec<PatternSpec>),
}

impl RuleSource {
    /// Validate and compile into a [`RuleSet`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Empty`] for an empty table or pattern list and
    /// [`RuleError::InvalidPattern`] for the first pattern that fails to compile.
    pub fn compile(self, options: RuleOptions) -> Result<RuleSet, RuleError> {
        match self {
            Self::Lookup(entries) => RuleSet::lookup(entries, options),
            Self::Patterns(specs) => RuleSet::patterns(specs, options),
        }
    }
}

/// Exact-match table from raw text to replacement text.
#[derive(Debug, Clone)]
pub struct LookupTable {
    entries: HashMap<String, String>,
    case_insensitive: bool,
}

impl LookupTable {
    fn new(entries: impl IntoIterator<Item = (String, String)>, options: RuleOptions) -> Self {
        let mut table = HashMap::new();
        let mut collisions = 0usize;
        for (key, value) in entries {
            let key = if options.case_insensitive {
                key.to_lowercase()
            } else {
                key
            };
            if table.insert(key, value).is_some() {
                collisions += 1;
            }
        }
        if collisions > 0 {
            warn!(
                collisions,
                "lookup table has duplicate keys, last entry wins"
            );
        }
        Self {
            entries: table,
            case_insensitive: options.case_insensitive,
        }
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        if self.case_insensitive {
            self.entries.get(&text.to_lowercase()).map(String::as_str)
        } else {
            self.entries.get(text).map(String::as_str)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A compiled regex rewrite rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
    replacement: String,
}

impl PatternRule {
    fn compile(index: usize, spec: &PatternSpec, options: RuleOptions) -> Result<Self, RuleError> {
        let regex = RegexBuilder::new(&spec.pattern)
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                index,
                pattern: spec.pattern.clone(),
                source,
            })?;
        Ok(Self {
            regex,
            replacement: expand_backslash_groups(&spec.replacement),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Replacement in `regex` syntax (`${1}` group references).
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Rewrite every match in `text`, or `None` when the pattern does not match.
    pub fn apply(&self, text: &str) -> Option<String> {
        if !self.regex.is_match(text) {
            return None;
        }
        Some(
            self.regex
                .replace_all(text, self.replacement.as_str())
                .into_owned(),
        )
    }
}

/// Rewrite `\1`..`\9` group references into `${1}`..`${9}`.
///
/// `\\` yields a literal backslash; any other escape is kept verbatim.
fn expand_backslash_groups(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some(digit) if digit.is_ascii_digit() => {
                chars.next();
                out.push_str("${");
                out.push(digit);
                out.push('}');
            }
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// Which kind of rule set is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    Lookup,
    Regex,
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup => f.write_str("lookup"),
            Self::Regex => f.write_str("regex"),
        }
    }
}

/// A compiled rule set.
#[derive(Debug, Clone)]
pub enum RuleSet {
    Lookup(LookupTable),
    Patterns(Vec<PatternRule>),
}

impl RuleSet {
    /// Build a lookup rule set.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Empty`] when the table has no entries.
    pub fn lookup(
        entries: impl IntoIterator<Item = (String, String)>,
        options: RuleOptions,
    ) -> Result<Self, RuleError> {
        let table = LookupTable::new(entries, options);
        if table.is_empty() {
            return Err(RuleError::Empty);
        }
        Ok(Self::Lookup(table))
    }

    /// Compile an ordered list of pattern rules.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Empty`] for an empty list, or
    /// [`RuleError::InvalidPattern`] naming the first rule that fails to compile.
    pub fn patterns(
        specs: impl IntoIterator<Item = PatternSpec>,
        options: RuleOptions,
    ) -> Result<Self, RuleError> {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(idx, spec)| PatternRule::compile(idx + 1, &spec, options))
            .collect::<Result<Vec<_>, _>>()?;
        if rules.is_empty() {
            return Err(RuleError::Empty);
        }
        Ok(Self::Patterns(rules))
    }

    pub fn mode(&self) -> RuleMode {
        match self {
            Self::Lookup(_) => RuleMode::Lookup,
            Self::Patterns(_) => RuleMode::Regex,
        }
    }

    /// Number of table entries or pattern rules.
    pub fn len(&self) -> usize {
        match self {
            Self::Lookup(table) => table.len(),
            Self::Patterns(rules) => rules.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generalize a text value.
    ///
    /// Returns `None` when no rule fires. Pattern rules are tried in declared
    /// order and only the first matching rule is applied. Lookup hits borrow
    /// from the table.
    pub fn generalize_text(&self, text: &str) -> Option<Cow<'_, str>> {
        match self {
            Self::Lookup(table) => table.get(text).map(Cow::Borrowed),
            Self::Patterns(rules) => rules
                .iter()
                .find_map(|rule| rule.apply(text))
                .map(Cow::Owned),
        }
    }
}
