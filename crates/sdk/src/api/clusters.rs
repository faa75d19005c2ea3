//! Opinion clusters API (`clusters/{id}/`).

use crate::client::CourtListenerClient;
use crate::error::Result;
use courtlistener_core::Cluster;

/// Clusters group the opinions of one decided case.
pub struct ClustersApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> ClustersApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: u64) -> Result<Cluster> {
        self.client.get_record("clusters", id).await
    }
}
