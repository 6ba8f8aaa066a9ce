use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::metadata;

/// Body of project create and update requests. All fields are required; the
/// owner is stamped server-side from the caller's identity, never taken from
/// the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBody {
    pub company_name: String,
    pub sector: String,
    pub region: String,
    pub project_status: String,
    pub contact_person: String,
}

impl ProjectBody {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.company_name.trim().is_empty() {
            return Err(ApiError::Validation("companyName is required".into()));
        }
        if self.contact_person.trim().is_empty() {
            return Err(ApiError::Validation("contactPerson is required".into()));
        }
        if !metadata::REGIONS.contains(&self.region.as_str()) {
            return Err(ApiError::Validation(format!(
                "unknown region: {}",
                self.region
            )));
        }
        if !metadata::SECTORS.contains(&self.sector.as_str()) {
            return Err(ApiError::Validation(format!(
                "unknown sector: {}",
                self.sector
            )));
        }
        if !metadata::PROJECT_STATUSES.contains(&self.project_status.as_str()) {
            return Err(ApiError::Validation(format!(
                "unknown project status: {}",
                self.project_status
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
