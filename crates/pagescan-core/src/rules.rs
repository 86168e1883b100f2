//! Match rules for important pages
//!
//! A page is important when its text contains at least one rule pattern.
//! Literal patterns are plain case-insensitive containment; regex patterns
//! are compiled case-insensitive and multi-line so `^`/`$` anchor section
//! headers to their own line.

use crate::error::RuleError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    #[default]
    Literal,
    Regex,
}

/// One configured pattern with its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub kind: PatternKind,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl MatchRule {
    pub fn literal(id: &str, pattern: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            pattern: pattern.to_string(),
            kind: PatternKind::Literal,
            category: category.to_string(),
            weight: default_weight(),
        }
    }

    pub fn regex(id: &str, pattern: &str, category: &str) -> Self {
        Self {
            kind: PatternKind::Regex,
            ..Self::literal(id, pattern, category)
        }
    }
}

/// Clause markers found in the road-project concession agreements this tool was built for
pub fn contract_rules() -> Vec<MatchRule> {
    vec![
        MatchRule::regex(
            "agreement-preamble",
            r"(?:This\s+)?Agreement\s+is\s+entered\s+into",
            "preamble",
        ),
        MatchRule::regex(
            "schedule-j",
            r"^\s*SCHEDULE\s*[- ]*\s*J\s*$",
            "schedule reference",
        ),
        MatchRule::regex("article-19", r"^\s*ARTICLE\s+19\s*$", "contract price"),
        MatchRule::regex(
            "schedule-h",
            r"^\s*SCHEDULE\s*[- ]*\s*H\s*$",
            "schedule reference",
        ),
    ]
}

#[derive(Debug)]
enum Matcher {
    /// Pattern already lowercased
    Literal(String),
    Regex(Regex),
}

/// Validated, compiled rules. Read-only once built and shared by every page worker.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<(MatchRule, Matcher)>,
}

impl RuleSet {
    pub fn new(rules: Vec<MatchRule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if rule.pattern.trim().is_empty() {
                return Err(RuleError::EmptyPattern(rule.id));
            }
            if !seen.insert(rule.id.clone()) {
                return Err(RuleError::DuplicateId(rule.id));
            }

            let matcher = match rule.kind {
                PatternKind::Literal => Matcher::Literal(rule.pattern.to_lowercase()),
                PatternKind::Regex => {
                    let regex = RegexBuilder::new(&rule.pattern)
                        .case_insensitive(true)
                        .multi_line(true)
                        .build()
                        .map_err(|e| RuleError::InvalidRegex {
                            id: rule.id.clone(),
                            message: e.to_string(),
                        })?;
                    Matcher::Regex(regex)
                }
            };
            compiled.push((rule, matcher));
        }

        Ok(Self { rules: compiled })
    }

    /// The built-in contract rules
    pub fn contract_defaults() -> Self {
        Self::new(contract_rules()).expect("built-in contract rules are valid")
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchRule> {
        self.rules.iter().map(|(rule, _)| rule)
    }

    /// Ids of every rule that matches `text`
    pub fn matches(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .filter(|(_, matcher)| match matcher {
                Matcher::Literal(pattern) => lowered.contains(pattern.as_str()),
                Matcher::Regex(regex) => regex.is_match(text),
            })
            .map(|(rule, _)| rule.id.clone())
            .collect()
    }
}
