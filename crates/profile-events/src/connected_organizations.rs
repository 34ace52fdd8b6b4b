//! Connected-organization counters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EventsError, EventsResult};

const PAYLOAD: &str = "connected organizations";

/// Aggregate record for one relying party the principal has logged in to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedOrganization {
    /// Entity ID of the relying party.
    pub id: String,

    /// Display name of the service.
    pub name: String,

    /// How many times the principal has authenticated to this party.
    pub times_authenticated: u64,

    /// IDs of the attributes released during the most recent
    /// authentication; replaced wholesale on each login.
    #[serde(default)]
    pub last_attributes: Vec<String>,
}

/// All connected organizations for one principal, keyed by relying-party
/// entity ID.
///
/// The wire format is a JSON object mapping entity ID to the aggregate
/// record. Unlike the login history this collection is unbounded; one
/// entry exists per distinct relying party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectedOrganizations {
    organizations: HashMap<String, ConnectedOrganization>,
}

impl ConnectedOrganizations {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a collection from its stored JSON form.
    ///
    /// ## Errors
    ///
    /// Returns a decode error if the text is not a valid organization map.
    pub fn parse(text: &str) -> EventsResult<Self> {
        serde_json::from_str(text).map_err(|e| EventsError::decode(PAYLOAD, e))
    }

    /// Encodes the collection to its stored JSON form.
    ///
    /// ## Errors
    ///
    /// Returns an encode error if serialization fails.
    pub fn serialize(&self) -> EventsResult<String> {
        serde_json::to_string(self).map_err(|e| EventsError::encode(PAYLOAD, e))
    }

    /// Records one authentication to a relying party.
    ///
    /// Creates the entry with a count of one on first login, otherwise
    /// increments the counter. The display name and released-attribute
    /// list are replaced either way, so the record tracks the most recent
    /// login.
    pub fn record_authentication(
        &mut self,
        relying_party_id: impl Into<String>,
        name: impl Into<String>,
        attribute_ids: Vec<String>,
    ) {
        let id = relying_party_id.into();
        let name = name.into();

        self.organizations
            .entry(id.clone())
            .and_modify(|org| {
                org.times_authenticated += 1;
                org.name.clone_from(&name);
                org.last_attributes.clone_from(&attribute_ids);
            })
            .or_insert(ConnectedOrganization {
                id,
                name,
                times_authenticated: 1,
                last_attributes: attribute_ids,
            });
    }

    /// Returns the record for a relying party, if any.
    #[must_use]
    pub fn get(&self, relying_party_id: &str) -> Option<&ConnectedOrganization> {
        self.organizations.get(relying_party_id)
    }

    /// Removes the record for a relying party.
    pub fn remove(&mut self, relying_party_id: &str) -> Option<ConnectedOrganization> {
        self.organizations.remove(relying_party_id)
    }

    /// Iterates over the records in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectedOrganization> {
        self.organizations.values()
    }

    /// Returns the number of connected organizations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.organizations.len()
    }

    /// Checks whether no organizations are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_authentication_creates_entry() {
        let mut orgs = ConnectedOrganizations::new();
        orgs.record_authentication("https://sp.example.org", "Example SP", vec![
            "uid".to_string(),
        ]);

        let org = orgs.get("https://sp.example.org").unwrap();
        assert_eq!(org.times_authenticated, 1);
        assert_eq!(org.last_attributes, vec!["uid".to_string()]);
    }

    #[test]
    fn counter_is_monotonic_and_attributes_replaced() {
        let mut orgs = ConnectedOrganizations::new();
        orgs.record_authentication("sp", "SP", vec!["uid".to_string(), "mail".to_string()]);
        orgs.record_authentication("sp", "SP", vec!["eppn".to_string()]);

        let org = orgs.get("sp").unwrap();
        assert_eq!(org.times_authenticated, 2);
        assert_eq!(org.last_attributes, vec!["eppn".to_string()]);
    }

    #[test]
    fn organizations_are_independent() {
        let mut orgs = ConnectedOrganizations::new();
        orgs.record_authentication("a", "A", vec![]);
        orgs.record_authentication("b", "B", vec![]);
        orgs.record_authentication("a", "A", vec![]);

        assert_eq!(orgs.get("a").unwrap().times_authenticated, 2);
        assert_eq!(orgs.get("b").unwrap().times_authenticated, 1);
    }

    #[test]
    fn round_trip() {
        let mut orgs = ConnectedOrganizations::new();
        orgs.record_authentication("sp", "SP", vec!["uid".to_string()]);
        orgs.record_authentication("sp", "SP", vec!["uid".to_string()]);

        let back = ConnectedOrganizations::parse(&orgs.serialize().unwrap()).unwrap();
        assert_eq!(back, orgs);
    }

    #[test]
    fn round_trip_empty() {
        let orgs = ConnectedOrganizations::new();
        let back = ConnectedOrganizations::parse(&orgs.serialize().unwrap()).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn wire_format_is_keyed_by_entity_id() {
        let mut orgs = ConnectedOrganizations::new();
        orgs.record_authentication("sp", "SP", vec![]);

        let json = orgs.serialize().unwrap();
        assert!(json.starts_with("{\"sp\":"));
        assert!(json.contains("timesAuthenticated"));
    }
}
