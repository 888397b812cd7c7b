//! Search result views

use std::collections::HashSet;

use crate::codec::{deserialize_list, IndexedValue, Keyword, Location};
use crate::error::CodecError;

/// IndexedValues discovered at one graph level, handed to progress callbacks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntermediateResults {
    values: Vec<IndexedValue>,
}

impl IntermediateResults {
    pub fn new(values: Vec<IndexedValue>) -> Self {
        Self { values }
    }

    /// Decode a serialized list of encoded IndexedValues
    pub fn from_serialized(bytes: &[u8]) -> Result<Self, CodecError> {
        let values = deserialize_list(bytes)?
            .iter()
            .map(|v| IndexedValue::from_bytes(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    pub fn values(&self) -> &[IndexedValue] {
        &self.values
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.values.iter().filter_map(IndexedValue::as_location)
    }

    /// Keywords the walk will follow next, depth permitting
    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.values.iter().filter_map(IndexedValue::as_keyword)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Locations grouped by the keyword that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    groups: Vec<(Keyword, Vec<Location>)>,
}

impl SearchResults {
    pub fn new(groups: Vec<(Keyword, Vec<Location>)>) -> Self {
        Self { groups }
    }

    pub fn get(&self, keyword: &Keyword) -> Option<&[Location]> {
        self.groups
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, locations)| locations.as_slice())
    }

    /// Every location once, in first-occurrence order
    pub fn locations(&self) -> Vec<Location> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .flat_map(|(_, locations)| locations)
            .filter(|l| seen.insert(*l))
            .cloned()
            .collect()
    }

    /// Number of distinct locations across every keyword
    pub fn total(&self) -> usize {
        self.locations().len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Keyword, &[Location])> {
        self.groups.iter().map(|(k, l)| (k, l.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl IntoIterator for SearchResults {
    type Item = (Keyword, Vec<Location>);
    type IntoIter = std::vec::IntoIter<(Keyword, Vec<Location>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::serialize_list;

    fn loc(s: &str) -> Location {
        Location::from(s)
    }

    #[test]
    fn test_intermediate_splits_locations_and_keywords() {
        let bytes = serialize_list(&[b"lL1".to_vec(), b"wnext".to_vec()]);
        let results = IntermediateResults::from_serialized(&bytes).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results.locations().collect::<Vec<_>>(), vec![&loc("L1")]);
        assert_eq!(
            results.keywords().collect::<Vec<_>>(),
            vec![&Keyword::from("next")]
        );
    }

    #[test]
    fn test_intermediate_rejects_unknown_tag() {
        let bytes = serialize_list(&[b"xL1".to_vec()]);
        assert!(matches!(
            IntermediateResults::from_serialized(&bytes),
            Err(CodecError::MalformedIndexedValue(_))
        ));
    }

    #[test]
    fn test_search_results_accessors() {
        let results = SearchResults::new(vec![
            (Keyword::from("alice"), vec![loc("L1"), loc("L2")]),
            (Keyword::from("bob"), vec![loc("L2"), loc("L3")]),
            (Keyword::from("carol"), vec![]),
        ]);

        assert_eq!(results.len(), 3);
        assert_eq!(results.total(), 4);
        assert_eq!(results.locations(), vec![loc("L1"), loc("L2"), loc("L3")]);
        assert_eq!(
            results.get(&Keyword::from("bob")),
            Some(&[loc("L2"), loc("L3")][..])
        );
        assert_eq!(results.get(&Keyword::from("carol")), Some(&[][..]));
        assert_eq!(results.get(&Keyword::from("dave")), None);
    }
}
