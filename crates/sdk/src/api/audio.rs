//! Oral argument audio API (`audio/{id}/`).

use crate::client::CourtListenerClient;
use crate::error::Result;
use courtlistener_core::Audio;

pub struct AudioApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> AudioApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    /// Get an oral argument recording's metadata.
    pub async fn get(&self, id: u64) -> Result<Audio> {
        self.client.get_record("audio", id).await
    }
}
