// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived vote statistics.
//!
//! Counts are never stored; they are computed from vote rows on every read.
//! This module turns the flat per-subcategory counts into the shapes the
//! detail view and the results panel display.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryRef, VoteCount, VoteStatistic};

/// Share of `votes` in `total` as a whole percentage, rounded to nearest.
///
/// Defined as 0 when `total` is 0.
pub fn calculate_percentage(votes: i64, total: i64) -> u32 {
    if total <= 0 {
        return 0;
    }
    ((votes as f64 / total as f64) * 100.0).round().max(0.0) as u32
}

/// Sum of all per-subcategory counts for a module.
pub fn total_votes(counts: &[VoteCount]) -> i64 {
    counts.iter().map(|c| c.count).sum()
}

/// Attaches percentages to raw counts for the module detail payload.
pub fn vote_statistics(counts: &[VoteCount]) -> (Vec<VoteStatistic>, i64) {
    let total = total_votes(counts);
    let stats = counts
        .iter()
        .map(|c| VoteStatistic {
            subcategory_id: c.subcategory_id.clone(),
            vote_count: c.count,
            percentage: calculate_percentage(c.count, total),
            subcategory: c.tag_subcategories.clone(),
        })
        .collect();
    (stats, total)
}

/// One subcategory line inside a category group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub subcategory_id: String,
    pub name: String,
    pub description: Option<String>,
    pub count: i64,
    /// Percentage of the module's total votes.
    pub percentage: u32,
}

/// All voted subcategories of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResults {
    pub category: CategoryRef,
    /// Sum of the counts in this group.
    pub total: i64,
    /// Sorted by descending count.
    pub results: Vec<ResultEntry>,
}

/// Groups counts by category, keeping categories in first-seen order and
/// sorting each group by descending count (ties keep input order).
pub fn group_by_category(counts: &[VoteCount]) -> Vec<CategoryResults> {
    let module_total = total_votes(counts);
    let mut groups: Vec<CategoryResults> = Vec::new();

    for count in counts {
        let category = &count.tag_subcategories.tag_categories;
        let entry = ResultEntry {
            subcategory_id: count.subcategory_id.clone(),
            name: count.tag_subcategories.name.clone(),
            description: count.tag_subcategories.description.clone(),
            count: count.count,
            percentage: calculate_percentage(count.count, module_total),
        };

        match groups.iter_mut().find(|g| g.category.id == category.id) {
            Some(group) => {
                group.total += entry.count;
                group.results.push(entry);
            }
            None => groups.push(CategoryResults {
                category: category.clone(),
                total: entry.count,
                results: vec![entry],
            }),
        }
    }

    for group in &mut groups {
        group.results.sort_by(|a, b| b.count.cmp(&a.count));
    }
    groups
}
