//! Courts API (`courts/{id}/`).

use crate::client::CourtListenerClient;
use crate::error::{Error, Result};
use courtlistener_core::Court;

pub struct CourtsApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> CourtsApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    /// Get a court by its slug (`scotus`, `ca9`, `nysd`, ...).
    pub async fn get(&self, id: &str) -> Result<Court> {
        let id = id.trim();
        if !is_court_id(id) {
            return Err(Error::InvalidInput(format!("invalid court id: {:?}", id)));
        }
        self.client.get_record("courts", id).await
    }
}

/// Court ids are lowercase slugs.
pub fn is_court_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_court_id() {
        assert!(is_court_id("scotus"));
        assert!(is_court_id("ca9"));
        assert!(is_court_id("cal_ct-app"));
        assert!(!is_court_id(""));
        assert!(!is_court_id("SCOTUS"));
        assert!(!is_court_id("../opinions"));
    }
}
