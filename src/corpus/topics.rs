//! Browse acts by area of law.
//!
//! An act belongs to a category when its lower-cased title contains any of
//! the category keywords, so one act can appear in several categories.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::stats::ActSummary;
use super::ActRecord;
use crate::types::{AppError, Result};

/// A fixed area-of-law category.
#[derive(Debug, Clone, Copy)]
pub struct TopicCategory {
    pub name: &'static str,
    pub slug: &'static str,
    pub keywords: &'static [&'static str],
}

pub const CATEGORIES: &[TopicCategory] = &[
    TopicCategory {
        name: "Criminal Law",
        slug: "criminal",
        keywords: &["criminal", "penal", "police", "crime"],
    },
    TopicCategory {
        name: "Civil Law",
        slug: "civil",
        keywords: &["civil", "contract", "property", "family"],
    },
    TopicCategory {
        name: "Commercial Law",
        slug: "commercial",
        keywords: &["company", "business", "trade", "commercial"],
    },
    TopicCategory {
        name: "Constitutional Law",
        slug: "constitutional",
        keywords: &["constitution", "fundamental", "rights"],
    },
    TopicCategory {
        name: "Administrative Law",
        slug: "administrative",
        keywords: &["government", "administrative", "public"],
    },
    TopicCategory {
        name: "Tax Law",
        slug: "tax",
        keywords: &["tax", "income", "customs", "vat"],
    },
    TopicCategory {
        name: "Labor Law",
        slug: "labor",
        keywords: &["labor", "employment", "worker", "industrial"],
    },
];

impl TopicCategory {
    pub fn matches(&self, act: &ActRecord) -> bool {
        let title = act.act_title.to_lowercase();
        self.keywords.iter().any(|k| title.contains(k))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub name: String,
    pub slug: String,
    pub keywords: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryActs {
    pub name: String,
    /// Total matching acts, before `limit` is applied.
    pub total: usize,
    pub acts: Vec<ActSummary>,
}

/// Look up a category by display name or slug, ignoring case.
pub fn find_category(name: &str) -> Option<&'static TopicCategory> {
    let wanted = name.trim();
    CATEGORIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted) || c.slug.eq_ignore_ascii_case(wanted))
}

pub fn category_counts(acts: &[ActRecord]) -> Vec<CategoryCount> {
    CATEGORIES
        .iter()
        .map(|c| CategoryCount {
            name: c.name.to_string(),
            slug: c.slug.to_string(),
            keywords: c.keywords.iter().map(|k| k.to_string()).collect(),
            count: acts.iter().filter(|a| c.matches(a)).count(),
        })
        .collect()
}

pub fn acts_in_category(acts: &[ActRecord], name: &str, limit: usize) -> Result<CategoryActs> {
    let category = find_category(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown topic category '{}'", name)))?;

    let matching: Vec<&ActRecord> = acts.iter().filter(|a| category.matches(a)).collect();

    Ok(CategoryActs {
        name: category.name.to_string(),
        total: matching.len(),
        acts: matching.into_iter().take(limit).map(ActSummary::from).collect(),
    })
}
