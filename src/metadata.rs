use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub const REGIONS: &[&str] = &[
    "Addis Ababa",
    "Afar",
    "Amhara",
    "Benishangul-Gumuz",
    "Dire Dawa",
    "Gambela",
    "Harari",
    "Oromia",
    "Sidama",
    "SNNP",
    "Somali",
    "Tigray",
    "Southwest",
    "Central Ethiopia",
];

pub const SECTORS: &[&str] = &[
    "Health",
    "Industry",
    "Agriculture",
    "Agro-processing",
    "Food & Beverage",
    "Construction & Engineering",
    "Chemicals & Detergents",
    "Textile & Garments",
    "Multi-sectoral",
    "Minerals",
];

pub const PROJECT_STATUSES: &[&str] = &["In Progress", "Functional", "Terminated"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    regions: &'static [&'static str],
    sectors: &'static [&'static str],
    project_statuses: &'static [&'static str],
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metadata", get(get_metadata))
}

async fn get_metadata() -> Json<Metadata> {
    Json(Metadata {
        regions: REGIONS,
        sectors: SECTORS,
        project_statuses: PROJECT_STATUSES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_are_non_empty_and_distinct() {
        assert!(!REGIONS.is_empty());
        assert!(!SECTORS.is_empty());
        assert_eq!(PROJECT_STATUSES.len(), 3);

        let mut sectors: Vec<_> = SECTORS.to_vec();
        sectors.sort_unstable();
        sectors.dedup();
        assert_eq!(sectors.len(), SECTORS.len());
    }
}
