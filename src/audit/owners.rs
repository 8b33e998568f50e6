//! Injected mapping from known error-message fragments to the party
//! responsible for them. Replaces the implicit file-on-disk lookup of the
//! legacy tooling with configuration handed to the service; it tags
//! telemetry only and never alters conclusion text.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub const UNKNOWN_OWNER: &str = "Unknown";

/// Ordered `(message fragment, owner)` pairs; the first fragment contained
/// in a fault message names its owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorOwnerMap {
    entries: Vec<(String, String)>,
}

impl ErrorOwnerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `<fragment> - <owner>` lines; anything else is ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, std::io::Error> {
        let mut entries = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            if let Some((fragment, owner)) = line.split_once(" - ") {
                let fragment = fragment.trim();
                let owner = owner.trim();
                if !fragment.is_empty() && !owner.is_empty() {
                    entries.push((fragment.to_string(), owner.to_string()));
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        Self::from_reader(File::open(path)?)
    }

    pub fn owner_for(&self, message: &str) -> &str {
        self.entries
            .iter()
            .find(|(fragment, _)| message.contains(fragment.as_str()))
            .map(|(_, owner)| owner.as_str())
            .unwrap_or(UNKNOWN_OWNER)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_fragment_owner_lines_and_skips_garbage() {
        let map = ErrorOwnerMap::from_reader(Cursor::new(
            "timeout while sending - Integration team\n\
             malformed payload - Portal team\n\
             a line without the separator\n\
             \n",
        ))
        .expect("reader never fails");
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.owner_for("queue timeout while sending notification"),
            "Integration team"
        );
        assert_eq!(map.owner_for("malformed payload rejected"), "Portal team");
    }

    #[test]
    fn first_matching_fragment_wins() {
        let map = ErrorOwnerMap::from_reader(Cursor::new(
            "error - First team\nerror while sending - Second team\n",
        ))
        .expect("reader never fails");
        assert_eq!(map.owner_for("error while sending"), "First team");
    }

    #[test]
    fn unknown_messages_fall_back() {
        assert_eq!(ErrorOwnerMap::new().owner_for("anything"), UNKNOWN_OWNER);
    }
}
