//! Review records - the input unit of the extraction pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single review flattened out of the nested source dataset
///
/// Records are immutable once loaded. The `index` is assigned by the loader in
/// traversal order and is the identity used for checkpointing, so it must stay
/// stable across runs over the same input document. Identifier, rating and
/// title values are kept exactly as the source wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// 1-based position in the flattened dataset
    #[serde(rename = "idx")]
    pub index: u64,

    /// Identifier of the user who wrote the review, as it appears in the source
    pub user_id: Value,

    /// Identifier of the reviewed product, as it appears in the source
    pub product_id: Value,

    /// Star rating, as it appears in the source
    pub rating: Value,

    /// Review headline, as it appears in the source; usually a string
    pub title: Value,

    /// Review body
    pub text: String,
}

impl ReviewRecord {
    /// The headline as text; non-string titles read as empty
    ///
    /// # Examples
    ///
    /// ```
    /// use reviewgraph_domain::ReviewRecord;
    /// use serde_json::{json, Value};
    ///
    /// let mut record = ReviewRecord {
    ///     index: 1,
    ///     user_id: json!("u1"),
    ///     product_id: json!("p1"),
    ///     rating: json!(5),
    ///     title: json!("Great"),
    ///     text: "Love the faux nails".into(),
    /// };
    /// assert_eq!(record.title_text(), "Great");
    ///
    /// record.title = Value::Null;
    /// assert_eq!(record.title_text(), "");
    /// ```
    pub fn title_text(&self) -> &str {
        self.title.as_str().unwrap_or_default()
    }
}
