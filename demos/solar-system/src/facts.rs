use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Fact table shipped with the crate, keyed by body name.
const BODY_FACTS: &str = include_str!("../data/bodies.json");

/// Info-panel content for one body. Keys are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactSheet {
    pub diameter: String,
    pub day_length: String,
    pub year_length: String,
    pub moons: u32,
    pub temperature: String,
    pub fact: String,
}

#[derive(Debug, Clone, Default)]
pub struct FactRegistry {
    sheets: HashMap<String, FactSheet>,
}

impl FactRegistry {
    /// Parse the embedded fact table.
    pub fn load() -> Result<Self, serde_json::Error> {
        Self::from_json(BODY_FACTS)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self { sheets: serde_json::from_str(json)? })
    }

    pub fn get(&self, name: &str) -> Option<&FactSheet> {
        self.sheets.get(name)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::{body_name, BODY_COUNT};

    #[test]
    fn every_body_has_a_sheet() {
        let facts = FactRegistry::load().unwrap();
        assert_eq!(facts.len(), BODY_COUNT);
        for i in 0..BODY_COUNT {
            let name = body_name(i).unwrap();
            assert!(facts.get(name).is_some(), "missing facts for {name}");
        }
    }

    #[test]
    fn sheet_fields() {
        let facts = FactRegistry::load().unwrap();
        let jupiter = facts.get("Jupiter").unwrap();
        assert_eq!(jupiter.moons, 79);
        assert_eq!(jupiter.day_length, "9.9 hours");
        assert_eq!(facts.get("Sun").unwrap().year_length, "N/A (Center of Solar System)");
    }

    #[test]
    fn unknown_name_is_none() {
        let facts = FactRegistry::load().unwrap();
        assert!(facts.get("Nibiru").is_none());
        assert!(facts.get("earth").is_none());
    }

    #[test]
    fn malformed_table_is_an_error() {
        assert!(FactRegistry::from_json("{\"Sun\": {\"diameter\": 3}}").is_err());
        assert!(FactRegistry::from_json("[").is_err());
    }
}
