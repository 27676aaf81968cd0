//! Short identifier generation for project rows.
//!
//! Project ids are fixed-length alphanumeric strings rather than UUID values
//! so they stay URL-safe and compact. 16 characters over `[0-9A-Za-z]` gives
//! 62^16 possible values, which is collision-resistant for any realistic
//! number of users.

use rand::{Rng, distr::Alphanumeric};

/// Length of a generated project id. Fits the `string(36)` primary key with
/// room to spare.
pub const PROJECT_ID_LEN: usize = 16;

/// Generate a new random project id.
#[must_use]
pub fn new_project_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(PROJECT_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_fixed_length_alphanumeric() {
        for _ in 0..100 {
            let id = new_project_id();
            assert_eq!(id.len(), PROJECT_ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn ids_do_not_collide_in_bulk() {
        let ids: HashSet<String> = (0..1000).map(|_| new_project_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
