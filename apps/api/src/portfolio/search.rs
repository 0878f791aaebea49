use serde::{Deserialize, Serialize};

use crate::models::project::Project;
use crate::models::skill::Skill;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
}

/// Case-insensitive substring match. Input order is preserved and a blank
/// query matches nothing.
pub fn search(query: &str, skills: Vec<Skill>, projects: Vec<Project>) -> SearchResults {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchResults {
            query: query.to_string(),
            skills: Vec::new(),
            projects: Vec::new(),
        };
    }

    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    SearchResults {
        query: query.to_string(),
        skills: skills.into_iter().filter(|s| contains(&s.name)).collect(),
        projects: projects
            .into_iter()
            .filter(|p| {
                contains(&p.title)
                    || p.description.as_deref().is_some_and(contains)
                    || p.technologies.iter().any(|t| contains(t))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Category;
    use chrono::Utc;
    use uuid::Uuid;

    fn skill(name: &str) -> Skill {
        Skill {
            id: Uuid::new_v4(),
            name: name.to_string(),
            icon: None,
            order_index: 0,
            created_at: Utc::now(),
        }
    }

    fn project(title: &str, description: Option<&str>, technologies: &[&str]) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.map(str::to_string),
            image_urls: vec!["cover.png".to_string()],
            project_url: None,
            technologies: technologies.iter().map(|t| t.to_string()).collect(),
            category: Category::Projects,
            order_index: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let results = search("   ", vec![skill("Rust")], vec![project("Rust CLI", None, &[])]);
        assert!(results.skills.is_empty());
        assert!(results.projects.is_empty());
    }

    #[test]
    fn test_matches_are_case_insensitive() {
        let results = search("rust", vec![skill("Rust"), skill("Go")], vec![]);
        assert_eq!(results.skills.len(), 1);
        assert_eq!(results.skills[0].name, "Rust");
    }

    #[test]
    fn test_project_fields_searched() {
        let projects = vec![
            project("Weather station", None, &["Arduino"]),
            project("Blog", Some("Static site in Rust"), &[]),
            project("Chat", None, &["Go", "Rust"]),
            project("Paint", None, &["TypeScript"]),
        ];
        let results = search("RUST", vec![], projects);
        let titles: Vec<_> = results.projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Blog", "Chat"]);
    }
}
