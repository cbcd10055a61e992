//! Identifiers for concept nodes and affective records.
//!
//! Names are what callers use to find a concept; ids are what links store,
//! so a concept can be found again after a snapshot round trip without the
//! graph depending on name stability.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! memory_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        // Short form keeps graph dumps readable.
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let full = self.0.simple().to_string();
                write!(f, "{}:{}", $tag, &full[..8])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

memory_id!(
    /// Stable id of a concept node; link targets point at these.
    ConceptId,
    "concept"
);

memory_id!(
    /// Id handed back when an experience is stored.
    RecordId,
    "record"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_concept_gets_its_own_id() {
        let ids: HashSet<ConceptId> = (0..64).map(|_| ConceptId::new()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn test_record_id_serializes_as_bare_uuid() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let restored: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }

    #[test]
    fn test_debug_names_the_kind() {
        let concept = format!("{:?}", ConceptId::new());
        let record = format!("{:?}", RecordId::new());
        assert!(concept.starts_with("concept:"));
        assert_eq!(concept.len(), "concept:".len() + 8);
        assert!(record.starts_with("record:"));
    }
}
