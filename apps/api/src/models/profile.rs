use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{apply_nullable, nullable};
use crate::errors::StoreError;

/// The portfolio owner's profile. At most one exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
    pub projects_count: i32,
    pub followers_count: i32,
    pub following_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for POST and PUT /api/profile.
///
/// Nullable columns are tri-state: omitted keeps the stored value, `null`
/// clears it, a string sets it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    pub username: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: Option<Option<String>>,
    pub projects_count: Option<i32>,
    pub followers_count: Option<i32>,
    pub following_count: Option<i32>,
}

impl ProfileFields {
    /// Builds the first profile. `username` must be present and non-empty.
    pub fn into_new(self, now: DateTime<Utc>) -> Result<Profile, StoreError> {
        let username = required_username(self.username)?;
        Ok(Profile {
            id: Uuid::new_v4(),
            username,
            full_name: self.full_name.flatten(),
            bio: self.bio.flatten(),
            website: self.website.flatten(),
            avatar_url: self.avatar_url.flatten(),
            projects_count: self.projects_count.unwrap_or(0),
            followers_count: self.followers_count.unwrap_or(0),
            following_count: self.following_count.unwrap_or(0),
            created_at: now,
            updated_at: now,
        })
    }

    /// `None` means "not supplied"; a supplied blank username is rejected.
    pub fn checked_username(&self) -> Result<Option<String>, StoreError> {
        self.username
            .clone()
            .map(|u| required_username(Some(u)))
            .transpose()
    }

    /// Shallow merge: supplied fields overwrite, omitted ones are left alone.
    /// Serves both POST (after creation) and PUT. `updated_at` is left untouched.
    pub fn merge_into(self, profile: &mut Profile) -> Result<(), StoreError> {
        if let Some(username) = self.username {
            profile.username = required_username(Some(username))?;
        }
        apply_nullable(&mut profile.full_name, self.full_name);
        apply_nullable(&mut profile.bio, self.bio);
        apply_nullable(&mut profile.website, self.website);
        apply_nullable(&mut profile.avatar_url, self.avatar_url);
        if let Some(n) = self.projects_count {
            profile.projects_count = n;
        }
        if let Some(n) = self.followers_count {
            profile.followers_count = n;
        }
        if let Some(n) = self.following_count {
            profile.following_count = n;
        }
        Ok(())
    }
}

fn required_username(username: Option<String>) -> Result<String, StoreError> {
    match username {
        Some(u) if !u.trim().is_empty() => Ok(u),
        _ => Err(StoreError::missing_field("username")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(username: &str) -> ProfileFields {
        ProfileFields {
            username: Some(username.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_profile_defaults_counters() {
        let p = fields("ada").into_new(Utc::now()).unwrap();
        assert_eq!(p.username, "ada");
        assert_eq!(p.projects_count, 0);
        assert_eq!(p.followers_count, 0);
        assert_eq!(p.following_count, 0);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn test_new_profile_requires_username() {
        let err = ProfileFields::default().into_new(Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = fields("   ").into_new(Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_merge_leaves_omitted_fields() {
        let mut p = ProfileFields {
            username: Some("ada".into()),
            bio: Some(Some("engines".into())),
            followers_count: Some(12),
            ..Default::default()
        }
        .into_new(Utc::now())
        .unwrap();
        let before = p.updated_at;

        ProfileFields {
            full_name: Some(Some("Ada Lovelace".into())),
            ..Default::default()
        }
        .merge_into(&mut p)
        .unwrap();

        assert_eq!(p.username, "ada");
        assert_eq!(p.bio.as_deref(), Some("engines"));
        assert_eq!(p.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(p.followers_count, 12);
        assert_eq!(p.updated_at, before);
    }

    #[test]
    fn test_merge_rejects_blank_username() {
        let mut p = fields("ada").into_new(Utc::now()).unwrap();
        let err = fields("").merge_into(&mut p).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(p.username, "ada");
    }

    #[test]
    fn test_null_clears_and_omission_keeps() {
        let patch: ProfileFields =
            serde_json::from_value(json!({"bio": null, "website": "https://ada.dev"})).unwrap();
        assert_eq!(patch.bio, Some(None));
        assert_eq!(patch.avatar_url, None);

        let mut p = ProfileFields {
            username: Some("ada".into()),
            bio: Some(Some("engines".into())),
            avatar_url: Some(Some("ada.png".into())),
            ..Default::default()
        }
        .into_new(Utc::now())
        .unwrap();
        patch.merge_into(&mut p).unwrap();

        assert_eq!(p.bio, None);
        assert_eq!(p.website.as_deref(), Some("https://ada.dev"));
        assert_eq!(p.avatar_url.as_deref(), Some("ada.png"));
    }
}
