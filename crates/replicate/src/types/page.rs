use serde_json::{Map, Value};
use url::Url;

/// One page of a cursor-paginated listing.
///
/// Everything the API sent besides `results` is kept untouched in `metadata`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub results: Vec<T>,
    /// Pagination fields (`next`, `previous`, ...) exactly as received
    pub metadata: Map<String, Value>,
}

impl<T> Page<T> {
    /// URL of the next page, if any.
    pub fn next(&self) -> Option<&str> {
        self.metadata.get("next").and_then(Value::as_str)
    }

    /// URL of the previous page, if any.
    pub fn previous(&self) -> Option<&str> {
        self.metadata.get("previous").and_then(Value::as_str)
    }

    /// The `cursor` query parameter of the next page URL.
    pub fn next_cursor(&self) -> Option<String> {
        cursor_of(self.next()?)
    }

    /// Whether another page follows.
    pub fn has_next(&self) -> bool {
        self.next().is_some()
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether this page has no items.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

fn cursor_of(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "cursor")
        .map(|(_, value)| value.into_owned())
}
