use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::PortfolioStore;
use crate::errors::StoreError;
use crate::models::profile::{Profile, ProfileFields};
use crate::models::project::{Project, ProjectFields};
use crate::models::skill::{Skill, SkillFields};

/// PostgreSQL-backed store. Schema lives in `migrations/`.
///
/// The profile table's primary key is a boolean pinned to TRUE, so the
/// singleton is enforced by the database rather than by query convention.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Overwrites the supplied fields of the existing profile in one UPDATE.
    /// `None` when no profile exists yet.
    async fn merge_profile(&self, fields: ProfileFields) -> Result<Option<Profile>, StoreError> {
        let username = fields.checked_username()?;
        let (set_full_name, full_name) = nullable_bind(fields.full_name);
        let (set_bio, bio) = nullable_bind(fields.bio);
        let (set_website, website) = nullable_bind(fields.website);
        let (set_avatar_url, avatar_url) = nullable_bind(fields.avatar_url);

        Ok(sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profile SET
                username        = COALESCE($1, username),
                full_name       = CASE WHEN $2 THEN $3 ELSE full_name END,
                bio             = CASE WHEN $4 THEN $5 ELSE bio END,
                website         = CASE WHEN $6 THEN $7 ELSE website END,
                avatar_url      = CASE WHEN $8 THEN $9 ELSE avatar_url END,
                projects_count  = COALESCE($10, projects_count),
                followers_count = COALESCE($11, followers_count),
                following_count = COALESCE($12, following_count)
            WHERE singleton
            RETURNING id, username, full_name, bio, website, avatar_url,
                      projects_count, followers_count, following_count,
                      created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(set_full_name)
        .bind(full_name)
        .bind(set_bio)
        .bind(bio)
        .bind(set_website)
        .bind(website)
        .bind(set_avatar_url)
        .bind(avatar_url)
        .bind(fields.projects_count)
        .bind(fields.followers_count)
        .bind(fields.following_count)
        .fetch_optional(&self.pool)
        .await?)
    }
}

/// Splits a tri-state patch field into "was it supplied" and the value to
/// write, for `CASE WHEN $supplied THEN $value ELSE column END`.
fn nullable_bind(field: Option<Option<String>>) -> (bool, Option<String>) {
    (field.is_some(), field.flatten())
}

#[async_trait]
impl PortfolioStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        Ok(sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, username, full_name, bio, website, avatar_url,
                   projects_count, followers_count, following_count,
                   created_at, updated_at
            FROM profile
            WHERE singleton
            "#,
        )
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn upsert_profile(&self, fields: ProfileFields) -> Result<Profile, StoreError> {
        let Some(username) = fields.checked_username()? else {
            // Nothing to create from: merge into the existing row or report the gap.
            let merged = self
                .merge_profile(fields)
                .await?
                .ok_or_else(|| StoreError::missing_field("username"))?;
            info!("Merged profile {}", merged.id);
            return Ok(merged);
        };

        let (set_full_name, full_name) = nullable_bind(fields.full_name);
        let (set_bio, bio) = nullable_bind(fields.bio);
        let (set_website, website) = nullable_bind(fields.website);
        let (set_avatar_url, avatar_url) = nullable_bind(fields.avatar_url);

        // Single statement: concurrent callers race on the singleton key and the
        // loser falls into DO UPDATE instead of inserting a second row.
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profile
                (id, username, full_name, bio, website, avatar_url,
                 projects_count, followers_count, following_count,
                 created_at, updated_at)
            VALUES ($1, $2, $4, $6, $8, $10,
                    COALESCE($11, 0), COALESCE($12, 0), COALESCE($13, 0),
                    $14, $14)
            ON CONFLICT (singleton) DO UPDATE SET
                username        = EXCLUDED.username,
                full_name       = CASE WHEN $3 THEN $4 ELSE profile.full_name END,
                bio             = CASE WHEN $5 THEN $6 ELSE profile.bio END,
                website         = CASE WHEN $7 THEN $8 ELSE profile.website END,
                avatar_url      = CASE WHEN $9 THEN $10 ELSE profile.avatar_url END,
                projects_count  = COALESCE($11, profile.projects_count),
                followers_count = COALESCE($12, profile.followers_count),
                following_count = COALESCE($13, profile.following_count)
            RETURNING id, username, full_name, bio, website, avatar_url,
                      projects_count, followers_count, following_count,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&username)
        .bind(set_full_name)
        .bind(full_name)
        .bind(set_bio)
        .bind(bio)
        .bind(set_website)
        .bind(website)
        .bind(set_avatar_url)
        .bind(avatar_url)
        .bind(fields.projects_count)
        .bind(fields.followers_count)
        .bind(fields.following_count)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!("Upserted profile {} ({username})", profile.id);
        Ok(profile)
    }

    async fn replace_profile(&self, fields: ProfileFields) -> Result<Profile, StoreError> {
        let profile = self
            .merge_profile(fields)
            .await?
            .ok_or_else(|| StoreError::not_found("Profile", "singleton"))?;

        info!("Overwrote supplied profile fields on {}", profile.id);
        Ok(profile)
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, StoreError> {
        Ok(sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, icon, order_index, created_at
            FROM skills
            ORDER BY order_index ASC, seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_skill(&self, fields: SkillFields) -> Result<Skill, StoreError> {
        let skill = fields.into_new(Utc::now())?;

        let skill = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (id, name, icon, order_index, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, icon, order_index, created_at
            "#,
        )
        .bind(skill.id)
        .bind(&skill.name)
        .bind(&skill.icon)
        .bind(skill.order_index)
        .bind(skill.created_at)
        .fetch_one(&self.pool)
        .await?;

        info!("Created skill {} ({})", skill.id, skill.name);
        Ok(skill)
    }

    async fn update_skill(&self, id: Uuid, fields: SkillFields) -> Result<Skill, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut skill = sqlx::query_as::<_, Skill>(
            "SELECT id, name, icon, order_index, created_at FROM skills WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Skill", id))?;

        fields.merge_into(&mut skill)?;

        let skill = sqlx::query_as::<_, Skill>(
            r#"
            UPDATE skills SET name = $2, icon = $3, order_index = $4
            WHERE id = $1
            RETURNING id, name, icon, order_index, created_at
            "#,
        )
        .bind(id)
        .bind(&skill.name)
        .bind(&skill.icon)
        .bind(skill.order_index)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Updated skill {id}");
        Ok(skill)
    }

    async fn delete_skill(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected() > 0;
        if removed {
            info!("Deleted skill {id}");
        } else {
            debug!("Delete of unknown skill {id} ignored");
        }
        Ok(removed)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, image_urls, project_url, technologies,
                   category, order_index, created_at
            FROM projects
            ORDER BY order_index ASC, seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_project(&self, fields: ProjectFields) -> Result<Project, StoreError> {
        let project = fields.into_new(Utc::now())?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (id, title, description, image_urls, project_url, technologies,
                 category, order_index, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, image_urls, project_url, technologies,
                      category, order_index, created_at
            "#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_urls)
        .bind(&project.project_url)
        .bind(&project.technologies)
        .bind(project.category)
        .bind(project.order_index)
        .bind(project.created_at)
        .fetch_one(&self.pool)
        .await?;

        info!("Created project {} ({})", project.id, project.title);
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        fields: ProjectFields,
    ) -> Result<Project, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, image_urls, project_url, technologies,
                   category, order_index, created_at
            FROM projects
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Project", id))?;

        fields.merge_into(&mut project)?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                title = $2, description = $3, image_urls = $4, project_url = $5,
                technologies = $6, category = $7, order_index = $8
            WHERE id = $1
            RETURNING id, title, description, image_urls, project_url, technologies,
                      category, order_index, created_at
            "#,
        )
        .bind(id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_urls)
        .bind(&project.project_url)
        .bind(&project.technologies)
        .bind(project.category)
        .bind(project.order_index)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Updated project {id}");
        Ok(project)
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected() > 0;
        if removed {
            info!("Deleted project {id}");
        } else {
            debug!("Delete of unknown project {id} ignored");
        }
        Ok(removed)
    }
}

/// Needs a reachable PostgreSQL in DATABASE_URL: `cargo test --features pg-tests`.
#[cfg(all(test, feature = "pg-tests"))]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn skill(name: &str, order_index: i32) -> SkillFields {
        SkillFields {
            name: Some(name.to_string()),
            icon: None,
            order_index: Some(order_index),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_upserts_keep_one_row(pool: PgPool) {
        let store = Arc::new(PgStore::new(pool.clone()));
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert_profile(ProfileFields {
                        username: Some(format!("user{i}")),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
                    .id
            }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }

        assert!(ids.iter().all(|id| *id == ids[0]));
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_profile_merge_replace_and_clear(pool: PgPool) {
        let store = PgStore::new(pool);
        let err = store
            .replace_profile(ProfileFields {
                bio: Some(Some("x".into())),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store
            .upsert_profile(ProfileFields {
                bio: Some(Some("x".into())),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let created = store
            .upsert_profile(ProfileFields {
                username: Some("ada".into()),
                bio: Some(Some("engines".into())),
                website: Some(Some("https://ada.dev".into())),
                followers_count: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        let merged = store
            .upsert_profile(ProfileFields {
                full_name: Some(Some("Ada Lovelace".into())),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(merged.id, created.id);
        assert_eq!(merged.bio.as_deref(), Some("engines"));
        assert_eq!(merged.followers_count, 3);

        let replaced = store
            .replace_profile(ProfileFields {
                bio: Some(Some("new bio".into())),
                website: Some(None),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(replaced.username, "ada");
        assert_eq!(replaced.bio.as_deref(), Some("new bio"));
        assert_eq!(replaced.website, None);
        assert_eq!(replaced.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(replaced.updated_at, created.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_skill_order_ties_follow_insertion(pool: PgPool) {
        let store = PgStore::new(pool);
        for (name, idx) in [("b", 1), ("a", 0), ("c", 1), ("d", 0)] {
            store.create_skill(skill(name, idx)).await.unwrap();
        }
        for _ in 0..3 {
            let names: Vec<_> = store
                .list_skills()
                .await
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(names, vec!["a", "d", "b", "c"]);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_skill_update_delete_contract(pool: PgPool) {
        let store = PgStore::new(pool);
        let err = store
            .update_skill(Uuid::new_v4(), skill("x", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let created = store
            .create_skill(SkillFields {
                name: Some("C++".into()),
                icon: Some(Some("Cpu".into())),
                order_index: None,
            })
            .await
            .unwrap();
        let cleared = store
            .update_skill(
                created.id,
                SkillFields {
                    icon: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.icon, None);
        assert_eq!(cleared.name, "C++");

        assert!(store.delete_skill(created.id).await.unwrap());
        assert!(!store.delete_skill(created.id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_project_round_trip(pool: PgPool) {
        let store = PgStore::new(pool);
        let created = store
            .create_project(ProjectFields {
                title: Some("Mesh".into()),
                image_url: Some("mesh.png".into()),
                technologies: Some(vec!["Go".into(), "Rust".into()]),
                category: Some(crate::models::project::Category::IotWorks),
                ..Default::default()
            })
            .await
            .unwrap();

        let listed = store.list_projects().await.unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(listed[0].technologies, vec!["Go", "Rust"]);

        let err = store
            .update_project(
                created.id,
                ProjectFields {
                    image_urls: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(!store.delete_project(Uuid::new_v4()).await.unwrap());
    }
}
