//! Opinions API (`opinions/{id}/`).

use crate::client::CourtListenerClient;
use crate::error::Result;
use courtlistener_core::Opinion;

/// Opinions API for individual court opinions.
pub struct OpinionsApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> OpinionsApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    /// Get an opinion, including its full text fields.
    pub async fn get(&self, id: u64) -> Result<Opinion> {
        self.client.get_record("opinions", id).await
    }
}
