//! Resource store — the persistence seam behind every `/api` route.
//!
//! `AppState` carries an `Arc<dyn PortfolioStore>`: `PgStore` in production,
//! `MemoryStore` when no database is configured and in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::profile::{Profile, ProfileFields};
use crate::models::project::{Project, ProjectFields};
use crate::models::skill::{Skill, SkillFields};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Short tag reported by /health.
    fn backend(&self) -> &'static str;

    async fn get_profile(&self) -> Result<Option<Profile>, StoreError>;

    /// Creates the profile if absent, otherwise merges `fields` into it.
    /// Never produces a second profile, even under concurrent calls.
    async fn upsert_profile(&self, fields: ProfileFields) -> Result<Profile, StoreError>;

    /// Overwrites every mutable field of the existing profile.
    async fn replace_profile(&self, fields: ProfileFields) -> Result<Profile, StoreError>;

    /// Ascending `order_index`, insertion order on ties.
    async fn list_skills(&self) -> Result<Vec<Skill>, StoreError>;
    async fn create_skill(&self, fields: SkillFields) -> Result<Skill, StoreError>;
    async fn update_skill(&self, id: Uuid, fields: SkillFields) -> Result<Skill, StoreError>;
    /// Returns whether a record was removed.
    async fn delete_skill(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Ascending `order_index`, insertion order on ties.
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn create_project(&self, fields: ProjectFields) -> Result<Project, StoreError>;
    async fn update_project(&self, id: Uuid, fields: ProjectFields)
        -> Result<Project, StoreError>;
    /// Returns whether a record was removed.
    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError>;
}
