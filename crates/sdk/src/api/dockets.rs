//! Dockets API (`dockets/{id}/`).

use crate::client::CourtListenerClient;
use crate::error::Result;
use courtlistener_core::Docket;

pub struct DocketsApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> DocketsApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: u64) -> Result<Docket> {
        self.client.get_record("dockets", id).await
    }
}
