use serde::{Deserialize, Serialize};

/// Completed lesson indices of one user in one course.
///
/// Indices are kept as strings, the way the API stores them, in the order
/// they were first marked. Inserting an index twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct WatchedSet {
    entries: Vec<String>,
}

impl WatchedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership by string equality, as the API compares them.
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.contains(&index.to_string())
    }

    /// Record a lesson index. Returns false when it was already present.
    pub fn insert(&mut self, index: usize) -> bool {
        let entry = index.to_string();
        if self.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries that name a real lesson of a course with
    /// `lesson_count` lessons. Stale or malformed entries are ignored.
    pub fn count_within(&self, lesson_count: usize) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.parse::<usize>().ok())
            .filter(|i| *i < lesson_count)
            .count()
    }
}

impl From<Vec<String>> for WatchedSet {
    fn from(raw: Vec<String>) -> Self {
        let mut entries: Vec<String> = Vec::with_capacity(raw.len());
        for entry in raw {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Self { entries }
    }
}

impl From<WatchedSet> for Vec<String> {
    fn from(set: WatchedSet) -> Self {
        set.entries
    }
}

impl FromIterator<usize> for WatchedSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = WatchedSet::new();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

/// Result of asking to mark a lesson as watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MarkOutcome {
    /// The mutation was sent; `progress` is the refreshed percentage.
    Marked { progress: u8 },
    /// The lesson was already in the watched set; nothing was sent.
    AlreadyWatched { progress: u8 },
}

impl MarkOutcome {
    pub fn progress(&self) -> u8 {
        match self {
            MarkOutcome::Marked { progress } | MarkOutcome::AlreadyWatched { progress } => {
                *progress
            }
        }
    }

    pub fn was_sent(&self) -> bool {
        matches!(self, MarkOutcome::Marked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = WatchedSet::new();
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert_eq!(set.len(), 1);
        assert!(set.contains("3"));
        assert!(set.contains_index(3));
    }

    #[test]
    fn test_deserialize_dedups() {
        let set: WatchedSet = serde_json::from_str(r#"["0","1","1","2"]"#).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["0", "1", "2"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["0","1","2"]"#);
    }

    #[test]
    fn test_count_within_ignores_out_of_range() {
        let set = WatchedSet::from(vec![
            "0".to_string(),
            "4".to_string(),
            "9".to_string(),
            "intro".to_string(),
        ]);
        assert_eq!(set.count_within(5), 2);
    }

    #[test]
    fn test_string_membership_is_exact() {
        let set = WatchedSet::from(vec!["01".to_string()]);
        assert!(!set.contains_index(1));
    }
}
