//! Context scorer: text → per-category scores.

use std::fmt;

use super::rules::{boosters, RULES};
use crate::inquiry::Category;

/// Weight of a matched trigger phrase.
pub const TRIGGER_WEIGHT: f64 = 2.0;
/// Weight of a matched business-need phrase.
pub const BUSINESS_NEED_WEIGHT: f64 = 1.5;

/// One non-negative score per product category, in enumeration order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryScores([f64; 5]);

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from explicit values in enumeration order.
    pub fn from_values(values: [f64; 5]) -> Self {
        Self(values)
    }

    pub fn get(&self, category: Category) -> f64 {
        category.product_index().map_or(0.0, |i| self.0[i])
    }

    /// Add to a category's score. Adding to `Unclear` is a no-op.
    pub fn add(&mut self, category: Category, amount: f64) {
        if let Some(i) = category.product_index() {
            self.0[i] += amount;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::PRODUCTS.iter().copied().zip(self.0.iter().copied())
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// The strictly highest scoring category; the earlier category wins ties.
    ///
    /// Returns `(Unclear, 0.0)` when every score is zero.
    pub fn best(&self) -> (Category, f64) {
        let mut best = (Category::Unclear, 0.0);
        for (category, score) in self.iter() {
            if score > best.1 {
                best = (category, score);
            }
        }
        best
    }
}

impl fmt::Display for CategoryScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(category, score)| format!("{category}={score:.1}"))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// Score `text` against the rule table.
///
/// Each phrase counts once no matter how often it occurs; each booster fires
/// at most once.
pub fn score(text: &str) -> CategoryScores {
    let lower = text.to_lowercase();
    let mut scores = CategoryScores::new();

    for rule in RULES {
        for phrase in rule.trigger_phrases {
            if lower.contains(phrase) {
                scores.add(rule.category, TRIGGER_WEIGHT);
            }
        }
        for phrase in rule.business_need_phrases {
            if lower.contains(phrase) {
                scores.add(rule.category, BUSINESS_NEED_WEIGHT);
            }
        }
    }

    for booster in boosters() {
        if booster.pattern.is_match(&lower) {
            scores.add(booster.category, booster.bonus);
        }
    }

    scores
}
