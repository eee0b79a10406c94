use serde::Serialize;

/// A single response header as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Header name with its original casing.
    pub name: String,
    /// Header value, without the single separating space.
    pub value: String,
}

/// Response headers in arrival order.
///
/// Names compare ASCII case-insensitively. Each name appears at most once:
/// inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers {
    entries: Vec<Header>,
}

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a header, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|header| header.name.eq_ignore_ascii_case(&name))
        {
            return Some(std::mem::replace(&mut existing.value, value));
        }
        self.entries.push(Header { name, value });
        None
    }

    /// Look up a header value by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Whether a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headers were received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over headers in arrival order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let mut headers = Headers::new();
        assert_eq!(headers.insert("Transfer-Encoding", "chunked"), None);
        assert_eq!(headers.get("transfer-encoding"), Some("chunked"));
        assert_eq!(headers.get("TRANSFER-ENCODING"), Some("chunked"));
        assert!(!headers.contains("Content-Length"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut headers = Headers::new();
        let _ = headers.insert("A", "1");
        let _ = headers.insert("B", "2");
        assert_eq!(headers.insert("a", "3"), Some("1".to_string()));

        let pairs: Vec<(&str, &str)> = headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
        assert_eq!(headers.len(), 2);
    }
}
