//! Participant roster
//!
//! The ordered list of racer names a session is built from. Immutable for the
//! lifetime of a session; pruning produces a new roster.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_NAMES, MIN_VIABLE_ROSTER};

/// Names used when nobody typed any
pub const DEFAULT_NAMES: [&str; 25] = [
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Hank", "Iris", "Jack", "Karen",
    "Leo", "Mona", "Nick", "Olga", "Paul", "Quinn", "Rita", "Sam", "Tina", "Uriel", "Vera", "Will",
    "Xena", "Yara",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("enter at least one name")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    names: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            names: DEFAULT_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl Roster {
    /// Build from names: trims each, drops blanks, keeps the first `MAX_NAMES`
    pub fn from_names<I, N>(names: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .take(MAX_NAMES)
            .collect();

        if names.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(Self { names })
    }

    /// Parse one name per line
    pub fn parse(text: &str) -> Result<Self, RosterError> {
        Self::from_names(text.lines())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Enough racers for a meaningful heat
    pub fn is_viable(&self) -> bool {
        self.names.len() >= MIN_VIABLE_ROSTER
    }

    /// Copy with the lane order shuffled by `rng`
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut names = self.names.clone();
        names.shuffle(rng);
        Self { names }
    }

    /// Copy without the first racer called `name`
    pub fn without(&self, name: &str) -> Self {
        let mut names = self.names.clone();
        if let Some(pos) = names.iter().position(|n| n == name) {
            names.remove(pos);
        }
        Self { names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let roster = Roster::default();
        assert_eq!(roster.len(), 25);
        assert_eq!(roster.names()[0], "Alice");
        assert_eq!(roster.names()[24], "Yara");
    }

    #[test]
    fn test_parse_trims_and_skips_blanks() {
        let roster = Roster::parse("  Ana \n\n\tBruno\r\n   \nCaio").unwrap();
        assert_eq!(roster.names(), ["Ana", "Bruno", "Caio"]);
    }

    #[test]
    fn test_parse_caps_at_max() {
        let text: Vec<String> = (0..40).map(|i| format!("Duck {}", i)).collect();
        let roster = Roster::parse(&text.join("\n")).unwrap();
        assert_eq!(roster.len(), MAX_NAMES);
        assert_eq!(roster.names().last().map(String::as_str), Some("Duck 24"));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert_eq!(Roster::parse("   \n \n"), Err(RosterError::Empty));
        assert_eq!(Roster::from_names(Vec::<String>::new()), Err(RosterError::Empty));
    }

    #[test]
    fn test_shuffled_is_seeded_permutation() {
        use crate::sim::SeededRandom;

        let roster = Roster::default();
        let a = roster.shuffled(&mut SeededRandom::with_seed(3));
        let b = roster.shuffled(&mut SeededRandom::with_seed(3));
        assert_eq!(a, b);
        assert_ne!(a, roster);

        let mut sorted = a.names().to_vec();
        sorted.sort();
        let mut expected = roster.names().to_vec();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_without_and_viability() {
        let roster = Roster::from_names(["A", "B", "A"]).unwrap();
        let pruned = roster.without("A");
        assert_eq!(pruned.names(), ["B", "A"]);
        assert!(pruned.is_viable());

        let last = pruned.without("B").without("A");
        assert!(last.is_empty());
        assert!(!last.is_viable());

        assert_eq!(roster.without("Zed"), roster);
        assert!(roster.contains("B"));
    }
}
