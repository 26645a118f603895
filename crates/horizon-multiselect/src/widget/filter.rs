//! Case-insensitive substring search over option texts.

use crate::model::{OptionEntry, OptionModel};

/// A normalized search query.
///
/// The query is trimmed and lower-cased once; matching lower-cases each
/// option text and tests for containment. The empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    query: String,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.trim().to_lowercase(),
        }
    }

    /// The normalized query.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.query.is_empty() || text.to_lowercase().contains(&self.query)
    }

    /// Evaluate the filter against every option of `model`.
    pub fn apply(&self, model: &OptionModel) -> FilterResult {
        let option_visible: Vec<bool> = model.options().map(|o| self.matches(&o.text)).collect();
        let mut group_visible = Vec::new();
        let mut index = 0;
        for entry in model.entries() {
            match entry {
                OptionEntry::Item(_) => index += 1,
                OptionEntry::Group(group) => {
                    let end = index + group.children.len();
                    group_visible.push(option_visible[index..end].iter().any(|v| *v));
                    index = end;
                }
            }
        }
        let visible_count = option_visible.iter().filter(|v| **v).count();
        FilterResult {
            option_visible,
            group_visible,
            visible_count,
            show_no_results: !self.is_empty() && visible_count == 0,
        }
    }
}

/// Visibility computed by [`SearchFilter::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// Per option, in display order.
    pub option_visible: Vec<bool>,
    /// Per group, in display order. A group is visible iff any child is.
    pub group_visible: Vec<bool>,
    pub visible_count: usize,
    /// Only for a non-empty query that hides every option.
    pub show_no_results: bool,
}

impl FilterResult {
    /// Display-order indices of the visible options.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.option_visible
            .iter()
            .enumerate()
            .filter_map(|(i, visible)| visible.then_some(i))
            .collect()
    }
}
