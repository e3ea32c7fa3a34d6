//! Type-safe, efficient identifiers for feed entities.
//!
//! All identifiers use Arc<str> for cheap cloning and minimal memory overhead.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        // Lexicographic, so sorted iteration is stable across runs
        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.cmp(&other.0)
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

impl_identifier!(StopIdentifier);
impl_identifier!(FeedIdentifier);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = StopIdentifier::new("stop_123");
        let id2 = StopIdentifier::new("stop_123");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_ordering() {
        let mut ids = vec![
            StopIdentifier::new("b"),
            StopIdentifier::new("a10"),
            StopIdentifier::new("a1"),
        ];
        ids.sort();

        let sorted: Vec<&str> = ids.iter().map(StopIdentifier::as_str).collect();
        assert_eq!(sorted, vec!["a1", "a10", "b"]);
    }

    #[test]
    fn test_identifier_display() {
        let id = FeedIdentifier::new("budapest");
        assert_eq!(format!("{}", id), "budapest");
    }

    #[test]
    fn test_identifier_conversions() {
        let _id1: StopIdentifier = "stop_1".into();
        let _id2: FeedIdentifier = String::from("feed").into();
    }
}
