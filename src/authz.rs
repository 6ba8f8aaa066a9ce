use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Caller identity as claimed by the request.
///
/// The id/role pair arrives as plain `userId`/`userRole` query parameters, so
/// the gate can only enforce consistency of the claim, not its authenticity.
/// Authenticating the caller is the job of whatever sits in front of this
/// service.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct CallerParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(rename = "userRole")]
    user_role: Option<Role>,
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<CallerParams>::try_from_uri(&parts.uri)
            .map_err(|_| ApiError::Forbidden("caller identity required"))?;

        match (params.user_id, params.user_role) {
            (Some(user_id), Some(role)) if !user_id.is_empty() => Ok(Caller { user_id, role }),
            _ => Err(ApiError::Forbidden("caller identity required")),
        }
    }
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Ownership filter the project list query must apply: admins see every
    /// row, users only rows they created. Returning the filter here keeps the
    /// gate in charge of query construction rather than post-filtering.
    pub fn project_filter(&self) -> Option<&str> {
        match self.role {
            Role::Admin => None,
            Role::User => Some(&self.user_id),
        }
    }

    /// Admins may update any project; users only projects they created.
    pub fn authorize_project_update(&self, created_by: &str) -> Result<(), ApiError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::User if created_by == self.user_id => Ok(()),
            Role::User => Err(ApiError::Forbidden(
                "you can only edit projects you created",
            )),
        }
    }

    pub fn authorize_project_delete(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "only administrators can delete projects",
            ))
        }
    }

    /// Every User CRUD operation is admin-only.
    pub fn authorize_user_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("administrator role required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Caller {
        Caller {
            user_id: "admin-1".into(),
            role: Role::Admin,
        }
    }

    fn user(id: &str) -> Caller {
        Caller {
            user_id: id.into(),
            role: Role::User,
        }
    }

    #[test]
    fn admin_sees_all_projects() {
        assert_eq!(admin().project_filter(), None);
    }

    #[test]
    fn user_list_is_filtered_to_own_rows() {
        let caller = user("u-42");
        assert_eq!(caller.project_filter(), Some("u-42"));
    }

    #[test]
    fn admin_updates_any_project() {
        assert!(admin().authorize_project_update("someone-else").is_ok());
    }

    #[test]
    fn user_updates_own_project_only() {
        let caller = user("u-1");
        assert!(caller.authorize_project_update("u-1").is_ok());
        let err = caller.authorize_project_update("u-2").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn only_admin_deletes_projects() {
        assert!(admin().authorize_project_delete().is_ok());
        let err = user("u-1").authorize_project_delete().unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn user_crud_is_admin_only() {
        assert!(admin().authorize_user_admin().is_ok());
        let err = user("u-1").authorize_user_admin().unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn role_deserializes_from_lowercase() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }
}
