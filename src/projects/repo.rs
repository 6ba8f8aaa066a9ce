use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A registry entry. `created_by` is a weak reference to the creating user,
/// kept as an opaque string and compared only by the authorization gate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub company_name: String,
    pub sector: String,
    pub region: String,
    pub project_status: String,
    pub contact_person: String,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub struct ProjectFields<'a> {
    pub company_name: &'a str,
    pub sector: &'a str,
    pub region: &'a str,
    pub project_status: &'a str,
    pub contact_person: &'a str,
}

const COLUMNS: &str =
    "id, company_name, sector, region, project_status, contact_person, created_by, \
     created_at, updated_at";

impl Project {
    /// List projects, newest first. `created_by` is the gate's ownership
    /// filter: `None` lists every row.
    pub async fn list(
        db: &PgPool,
        created_by: Option<&str>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        match created_by {
            Some(owner) => {
                sqlx::query_as::<_, Project>(&format!(
                    "SELECT {COLUMNS} FROM projects WHERE created_by = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(owner)
                .fetch_all(db)
                .await
            }
            None => {
                sqlx::query_as::<_, Project>(&format!(
                    "SELECT {COLUMNS} FROM projects ORDER BY created_at DESC"
                ))
                .fetch_all(db)
                .await
            }
        }
    }

    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(
        db: &PgPool,
        fields: &ProjectFields<'_>,
        created_by: &str,
    ) -> Result<Project, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects \
             (company_name, sector, region, project_status, contact_person, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        ))
        .bind(fields.company_name)
        .bind(fields.sector)
        .bind(fields.region)
        .bind(fields.project_status)
        .bind(fields.contact_person)
        .bind(created_by)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        fields: &ProjectFields<'_>,
    ) -> Result<Project, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects \
             SET company_name = $1, sector = $2, region = $3, project_status = $4, \
                 contact_person = $5, updated_at = now() \
             WHERE id = $6 \
             RETURNING {COLUMNS}"
        ))
        .bind(fields.company_name)
        .bind(fields.sector)
        .bind(fields.region)
        .bind(fields.project_status)
        .bind(fields.contact_person)
        .bind(id)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
