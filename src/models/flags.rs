use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-station boolean flags aligned to the matrix row index.
///
/// Each detector produces one of these with exactly the key set of the input
/// matrix; flags combine with logical OR into the final exclusion mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationFlags {
    flags: BTreeMap<String, bool>,
}

impl StationFlags {
    /// All-false flags over the given station identifiers.
    pub fn all_clear<I, S>(station_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: station_ids
                .into_iter()
                .map(|id| (id.into(), false))
                .collect(),
        }
    }

    pub fn set(&mut self, station_id: &str, flagged: bool) {
        if let Some(entry) = self.flags.get_mut(station_id) {
            *entry = flagged;
        }
    }

    pub fn get(&self, station_id: &str) -> Option<bool> {
        self.flags.get(station_id).copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(id, &flagged)| (id.as_str(), flagged))
    }

    pub fn flagged(&self) -> Vec<&str> {
        self.flags
            .iter()
            .filter(|(_, &flagged)| flagged)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn count_flagged(&self) -> usize {
        self.flags.values().filter(|&&flagged| flagged).count()
    }

    /// Logical OR with another flag set over the same stations.
    pub fn or(&self, other: &StationFlags) -> StationFlags {
        let flags = self
            .flags
            .iter()
            .map(|(id, &flagged)| {
                let combined = flagged || other.get(id).unwrap_or(false);
                (id.clone(), combined)
            })
            .collect();

        StationFlags { flags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_clear() {
        let flags = StationFlags::all_clear(["a", "b", "c"]);
        assert_eq!(flags.len(), 3);
        assert_eq!(flags.count_flagged(), 0);
        assert_eq!(flags.get("a"), Some(false));
        assert_eq!(flags.get("missing"), None);
    }

    #[test]
    fn test_set_ignores_unknown_station() {
        let mut flags = StationFlags::all_clear(["a"]);
        flags.set("unknown", true);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags.count_flagged(), 0);
    }

    #[test]
    fn test_or_combines_masks() {
        let mut mislocated = StationFlags::all_clear(["a", "b", "c"]);
        mislocated.set("a", true);
        let mut indoor = StationFlags::all_clear(["a", "b", "c"]);
        indoor.set("c", true);

        let excluded = mislocated.or(&indoor);
        assert_eq!(excluded.get("a"), Some(true));
        assert_eq!(excluded.get("b"), Some(false));
        assert_eq!(excluded.get("c"), Some(true));
        assert_eq!(excluded.flagged(), vec!["a", "c"]);
    }
}
