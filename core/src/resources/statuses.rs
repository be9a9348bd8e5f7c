use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::normalize::Outcome;

const ENDPOINT: &str = "statuses";

/// Read-only `statuses` collection.
#[derive(Debug, Clone, Copy)]
pub struct Statuses<'a> {
    client: &'a Client,
}

impl<'a> Statuses<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Outcome> {
        self.client.send(Endpoint::get(ENDPOINT))
    }

    pub fn view(&self, id: u64) -> Result<Outcome> {
        self.client.send(Endpoint::get(format!("{ENDPOINT}/{id}")))
    }
}
