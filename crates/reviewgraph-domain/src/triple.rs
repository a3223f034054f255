//! Triple module - the atomic statement of the review knowledge graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// A subject-predicate-object statement extracted from a review
///
/// Entity labels conventionally use lowercase with underscores
/// (`faux_nails`), but nothing here enforces that convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Entity the statement is about
    pub subject: String,

    /// Relationship between subject and object
    pub predicate: String,

    /// Entity or value the subject relates to
    pub object: String,
}

impl Triple {
    /// Create a new triple
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Key under which two triples count as the same statement
    ///
    /// Each part is trimmed and lowercased.
    ///
    /// # Examples
    ///
    /// ```
    /// use reviewgraph_domain::Triple;
    ///
    /// let a = Triple::new("User", "Praises", "Scent");
    /// let b = Triple::new(" user", "praises ", "scent");
    /// assert_eq!(a.dedup_key(), b.dedup_key());
    /// ```
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.subject.trim().to_lowercase(),
            self.predicate.trim().to_lowercase(),
            self.object.trim().to_lowercase(),
        )
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_display() {
        let triple = Triple::new("user", "praises", "scent");
        assert_eq!(triple.to_string(), "(user, praises, scent)");
    }

    #[test]
    fn test_dedup_key_differs_on_content() {
        let a = Triple::new("user", "praises", "scent");
        let b = Triple::new("user", "criticizes", "scent");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_triple_serializes_with_canonical_keys() {
        let triple = Triple::new("user", "praises", "scent");
        let json = serde_json::to_string(&triple).unwrap();
        assert_eq!(
            json,
            r#"{"subject":"user","predicate":"praises","object":"scent"}"#
        );
    }
}
