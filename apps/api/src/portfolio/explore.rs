use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::project::{Category, Project};

/// A project placed in the combined explore feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub project: Project,
    pub category_label: &'static str,
}

/// Response of GET /api/explore: one key per category plus the flattened feed.
#[derive(Debug, Clone, Serialize)]
pub struct ExploreFeed {
    #[serde(flatten)]
    pub sections: BTreeMap<Category, Vec<Project>>,
    pub feed: Vec<FeedItem>,
}

/// Groups projects by category. Every category is present, even when empty.
///
/// Sections are sorted by `order_index`; the feed concatenates sections in
/// [`Category::ALL`] order, then stable-sorts by `order_index`, so equal
/// indices stay grouped by category.
pub fn build_explore(projects: Vec<Project>) -> ExploreFeed {
    let mut sections: BTreeMap<Category, Vec<Project>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();

    for project in projects {
        sections.entry(project.category).or_default().push(project);
    }
    for items in sections.values_mut() {
        items.sort_by_key(|p| p.order_index);
    }

    let mut feed: Vec<FeedItem> = Category::ALL
        .iter()
        .flat_map(|c| sections[c].iter())
        .map(|p| FeedItem {
            project: p.clone(),
            category_label: p.category.label(),
        })
        .collect();
    feed.sort_by_key(|item| item.project.order_index);

    ExploreFeed { sections, feed }
}
