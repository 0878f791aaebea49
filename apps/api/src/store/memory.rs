use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::PortfolioStore;
use crate::errors::StoreError;
use crate::models::profile::{Profile, ProfileFields};
use crate::models::project::{Project, ProjectFields};
use crate::models::skill::{Skill, SkillFields};

/// Process-local store. Vectors keep insertion order so a stable sort on
/// `order_index` yields the display order directly.
#[derive(Default)]
pub struct MemoryStore {
    profile: RwLock<Option<Profile>>,
    skills: RwLock<Vec<Skill>>,
    projects: RwLock<Vec<Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        Ok(self.profile.read().await.clone())
    }

    async fn upsert_profile(&self, fields: ProfileFields) -> Result<Profile, StoreError> {
        let mut slot = self.profile.write().await;
        let next = match slot.as_ref() {
            Some(existing) => {
                let mut merged = existing.clone();
                fields.merge_into(&mut merged)?;
                info!("Merged profile {}", merged.id);
                merged
            }
            None => {
                let created = fields.into_new(Utc::now())?;
                info!("Created profile {} ({})", created.id, created.username);
                created
            }
        };
        *slot = Some(next.clone());
        Ok(next)
    }

    async fn replace_profile(&self, fields: ProfileFields) -> Result<Profile, StoreError> {
        let mut slot = self.profile.write().await;
        let existing = slot
            .as_mut()
            .ok_or_else(|| StoreError::not_found("Profile", "singleton"))?;
        let mut updated = existing.clone();
        fields.merge_into(&mut updated)?;
        *existing = updated.clone();
        info!("Overwrote supplied profile fields on {}", updated.id);
        Ok(updated)
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, StoreError> {
        let mut skills = self.skills.read().await.clone();
        skills.sort_by_key(|s| s.order_index);
        Ok(skills)
    }

    async fn create_skill(&self, fields: SkillFields) -> Result<Skill, StoreError> {
        let skill = fields.into_new(Utc::now())?;
        self.skills.write().await.push(skill.clone());
        info!("Created skill {} ({})", skill.id, skill.name);
        Ok(skill)
    }

    async fn update_skill(&self, id: Uuid, fields: SkillFields) -> Result<Skill, StoreError> {
        let mut skills = self.skills.write().await;
        let skill = skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("Skill", id))?;
        let mut merged = skill.clone();
        fields.merge_into(&mut merged)?;
        *skill = merged.clone();
        info!("Updated skill {id}");
        Ok(merged)
    }

    async fn delete_skill(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut skills = self.skills.write().await;
        let before = skills.len();
        skills.retain(|s| s.id != id);
        let removed = skills.len() != before;
        if removed {
            info!("Deleted skill {id}");
        } else {
            debug!("Delete of unknown skill {id} ignored");
        }
        Ok(removed)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut projects = self.projects.read().await.clone();
        projects.sort_by_key(|p| p.order_index);
        Ok(projects)
    }

    async fn create_project(&self, fields: ProjectFields) -> Result<Project, StoreError> {
        let project = fields.into_new(Utc::now())?;
        self.projects.write().await.push(project.clone());
        info!("Created project {} ({})", project.id, project.title);
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        fields: ProjectFields,
    ) -> Result<Project, StoreError> {
        let mut projects = self.projects.write().await;
        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Project", id))?;
        let mut merged = project.clone();
        fields.merge_into(&mut merged)?;
        *project = merged.clone();
        info!("Updated project {id}");
        Ok(merged)
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut projects = self.projects.write().await;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        let removed = projects.len() != before;
        if removed {
            info!("Deleted project {id}");
        } else {
            debug!("Delete of unknown project {id} ignored");
        }
        Ok(removed)
    }
}
