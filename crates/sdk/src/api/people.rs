//! People API (`people/{id}/`).

use crate::client::CourtListenerClient;
use crate::error::Result;
use courtlistener_core::Person;

/// People API for judges and other legal professionals.
pub struct PeopleApi<'a> {
    client: &'a CourtListenerClient,
}

impl<'a> PeopleApi<'a> {
    pub(crate) fn new(client: &'a CourtListenerClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: u64) -> Result<Person> {
        self.client.get_record("people", id).await
    }
}
