use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{apply_nullable, nullable};
use crate::errors::StoreError;

/// Explore section a project is filed under.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    sqlx::Type,
)]
#[sqlx(type_name = "project_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Projects,
    Experiments,
    Hackathons,
    SideIdeas,
    IotWorks,
}

impl Category {
    /// Display order of the explore sections.
    pub const ALL: [Category; 5] = [
        Category::Projects,
        Category::Experiments,
        Category::Hackathons,
        Category::SideIdeas,
        Category::IotWorks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Projects => "Projects",
            Category::Experiments => "Experiments",
            Category::Hackathons => "Hackathons",
            Category::SideIdeas => "Side Ideas",
            Category::IotWorks => "IoT Works",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub project_url: Option<String>,
    pub technologies: Vec<String>,
    pub category: Category,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /api/projects and PUT /api/projects/:id.
///
/// Older clients send a single `image_url`; it is folded into `image_urls`.
/// `description` and `project_url` are tri-state: omitted keeps, `null` clears.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFields {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub image_url: Option<String>,
    pub image_urls: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_url: Option<Option<String>>,
    pub technologies: Option<Vec<String>>,
    pub category: Option<Category>,
    pub order_index: Option<i32>,
}

impl ProjectFields {
    /// `image_urls` wins over the legacy `image_url` when both are sent.
    fn images(&mut self) -> Option<Vec<String>> {
        match (self.image_urls.take(), self.image_url.take()) {
            (Some(urls), _) => Some(urls),
            (None, Some(url)) => Some(vec![url]),
            (None, None) => None,
        }
    }

    pub fn into_new(mut self, now: DateTime<Utc>) -> Result<Project, StoreError> {
        let images = self.images();
        Ok(Project {
            id: Uuid::new_v4(),
            title: required_title(self.title)?,
            description: self.description.flatten(),
            image_urls: required_images(images)?,
            project_url: self.project_url.flatten(),
            technologies: self.technologies.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            order_index: self.order_index.unwrap_or(0),
            created_at: now,
        })
    }

    pub fn merge_into(mut self, project: &mut Project) -> Result<(), StoreError> {
        let title = self.title.take().map(|t| required_title(Some(t))).transpose()?;
        let images = self.images().map(|i| required_images(Some(i))).transpose()?;

        if let Some(title) = title {
            project.title = title;
        }
        if let Some(images) = images {
            project.image_urls = images;
        }
        apply_nullable(&mut project.description, self.description);
        apply_nullable(&mut project.project_url, self.project_url);
        if let Some(technologies) = self.technologies {
            project.technologies = technologies;
        }
        if let Some(category) = self.category {
            project.category = category;
        }
        if let Some(order_index) = self.order_index {
            project.order_index = order_index;
        }
        Ok(())
    }
}

fn required_title(title: Option<String>) -> Result<String, StoreError> {
    match title {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(StoreError::missing_field("title")),
    }
}

fn required_images(images: Option<Vec<String>>) -> Result<Vec<String>, StoreError> {
    match images {
        Some(urls) if !urls.is_empty() => Ok(urls),
        _ => Err(StoreError::Validation(
            "at least one image is required".to_string(),
        )),
    }
}
