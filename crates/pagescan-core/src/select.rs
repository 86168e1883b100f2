//! Which pages go into the short document
//!
//! Runs after a scan and before subsetting. The scan outcome is never altered;
//! this only widens it with context pages or resolves `NoneFound`.

use crate::scan::ScanOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to keep when no page matched any rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoMatchPolicy {
    /// Keep only the leading pages
    #[default]
    LeadingPages,
    FullDocument,
    /// Produce no short document
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// First pages always kept (default: 2)
    #[serde(default = "default_leading_pages")]
    pub leading_pages: u32,
    /// Pages kept after each important page (default: 1)
    #[serde(default = "default_following_pages")]
    pub following_pages: u32,
    #[serde(default)]
    pub no_match: NoMatchPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            leading_pages: default_leading_pages(),
            following_pages: default_following_pages(),
            no_match: NoMatchPolicy::default(),
        }
    }
}

fn default_leading_pages() -> u32 {
    2
}

fn default_following_pages() -> u32 {
    1
}

/// Sorted page indices to keep, or `None` when the contract should be skipped
pub fn select_pages(
    outcome: &ScanOutcome,
    page_count: u32,
    config: &SelectionConfig,
) -> Option<Vec<u32>> {
    if page_count == 0 {
        return None;
    }
    let leading = 0..config.leading_pages.min(page_count);

    let selected: BTreeSet<u32> = match outcome {
        ScanOutcome::Found(important) => important
            .iter()
            .flat_map(|index| {
                let last = index.saturating_add(config.following_pages).min(page_count - 1);
                index..=last
            })
            .chain(leading)
            .filter(|&index| index < page_count)
            .collect(),
        ScanOutcome::NoneFound => match config.no_match {
            NoMatchPolicy::LeadingPages => leading.collect(),
            NoMatchPolicy::FullDocument => (0..page_count).collect(),
            NoMatchPolicy::Skip => return None,
        },
    };

    (!selected.is_empty()).then(|| selected.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ImportantPageSet;
    use pretty_assertions::assert_eq;

    fn found(indices: &[u32]) -> ScanOutcome {
        ScanOutcome::Found(ImportantPageSet::new(indices.iter().copied()).unwrap())
    }

    fn config(leading_pages: u32, following_pages: u32, no_match: NoMatchPolicy) -> SelectionConfig {
        SelectionConfig {
            leading_pages,
            following_pages,
            no_match,
        }
    }

    #[test]
    fn test_defaults_add_leading_and_next_page() {
        let selected = select_pages(&found(&[6, 14]), 40, &SelectionConfig::default());
        assert_eq!(selected, Some(vec![0, 1, 6, 7, 14, 15]));
    }

    #[test]
    fn test_exact_important_pages_without_context() {
        let selected = select_pages(&found(&[9, 2, 5]), 10, &config(0, 0, NoMatchPolicy::Skip));
        assert_eq!(selected, Some(vec![2, 5, 9]));
    }

    #[test]
    fn test_following_pages_clip_to_document() {
        let selected = select_pages(&found(&[8]), 10, &config(0, 5, NoMatchPolicy::Skip));
        assert_eq!(selected, Some(vec![8, 9]));
    }

    #[test]
    fn test_leading_pages_clip_to_document() {
        let selected = select_pages(&found(&[0]), 2, &config(5, 0, NoMatchPolicy::Skip));
        assert_eq!(selected, Some(vec![0, 1]));
    }

    #[test]
    fn test_overlapping_context_is_deduplicated() {
        let selected = select_pages(&found(&[1, 2, 3]), 6, &config(2, 2, NoMatchPolicy::Skip));
        assert_eq!(selected, Some(vec![0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_none_found_policies() {
        let none = ScanOutcome::NoneFound;
        assert_eq!(
            select_pages(&none, 12, &config(3, 1, NoMatchPolicy::LeadingPages)),
            Some(vec![0, 1, 2])
        );
        assert_eq!(
            select_pages(&none, 4, &config(3, 1, NoMatchPolicy::FullDocument)),
            Some(vec![0, 1, 2, 3])
        );
        assert_eq!(select_pages(&none, 4, &config(3, 1, NoMatchPolicy::Skip)), None);
    }

    #[test]
    fn test_leading_pages_policy_with_zero_leading_skips() {
        assert_eq!(
            select_pages(&ScanOutcome::NoneFound, 4, &config(0, 1, NoMatchPolicy::LeadingPages)),
            None
        );
    }

    #[test]
    fn test_policy_serializes_kebab_case() {
        let parsed: SelectionConfig = toml::from_str("no_match = \"full-document\"").unwrap();
        assert_eq!(parsed.no_match, NoMatchPolicy::FullDocument);
        assert_eq!(parsed.leading_pages, 2);
    }
}
