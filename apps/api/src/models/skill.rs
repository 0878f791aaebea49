use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{apply_nullable, nullable};
use crate::errors::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /api/skills and PUT /api/skills/:id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillFields {
    pub name: Option<String>,
    /// Omitted keeps the icon, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub icon: Option<Option<String>>,
    pub order_index: Option<i32>,
}

impl SkillFields {
    pub fn into_new(self, now: DateTime<Utc>) -> Result<Skill, StoreError> {
        Ok(Skill {
            id: Uuid::new_v4(),
            name: required_name(self.name)?,
            icon: self.icon.flatten(),
            order_index: self.order_index.unwrap_or(0),
            created_at: now,
        })
    }

    pub fn merge_into(self, skill: &mut Skill) -> Result<(), StoreError> {
        if let Some(name) = self.name {
            skill.name = required_name(Some(name))?;
        }
        apply_nullable(&mut skill.icon, self.icon);
        if let Some(order_index) = self.order_index {
            skill.order_index = order_index;
        }
        Ok(())
    }
}

fn required_name(name: Option<String>) -> Result<String, StoreError> {
    match name {
        Some(n) if !n.trim().is_empty() => Ok(n),
        _ => Err(StoreError::missing_field("name")),
    }
}
