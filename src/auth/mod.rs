use axum::Router;
use lazy_static::lazy_static;
use regex::Regex;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod link;
pub mod password;
pub mod reset;

pub fn router() -> Router<AppState> {
    handlers::reset_routes()
}

// The `:` exclusion keeps stored addresses safe to embed in the packed
// reset-link payload, which uses it as the field separator.
pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s:]+@[^@\s:]+\.[^@\s:]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+tag@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("alice@x"));
        assert!(!is_valid_email("ali ce@x.com"));
    }

    #[test]
    fn rejects_payload_delimiter_in_addresses() {
        assert!(!is_valid_email("a:b@x.com"));
        assert!(!is_valid_email("ab@x:1.com"));
    }
}
