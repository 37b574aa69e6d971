//! Header row lookup.

use std::collections::BTreeMap;

/// Mapping from header name to its position in one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    headers: Vec<String>,
    index: BTreeMap<String, usize>,
}

impl HeaderMap {
    /// Build a header map from a header row.
    ///
    /// A leading UTF-8 BOM is stripped from the first header. Returns the
    /// offending name when a header repeats.
    pub fn from_headers<I, S>(headers: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::default();
        for (idx, raw) in headers.into_iter().enumerate() {
            let name = normalize_header(raw.as_ref(), idx);
            if map.index.insert(name.clone(), idx).is_some() {
                return Err(name);
            }
            map.headers.push(name);
        }
        Ok(map)
    }

    pub fn index_of(&self, header: &str) -> Option<usize> {
        self.index.get(header).copied()
    }

    pub fn contains(&self, header: &str) -> bool {
        self.index.contains_key(header)
    }

    /// Header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Headers from `required` that this file does not provide, in input order.
    pub fn missing<'a, I>(&self, required: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        required
            .into_iter()
            .filter(|header| !self.contains(header))
            .map(str::to_string)
            .collect()
    }
}

fn normalize_header(raw: &str, idx: usize) -> String {
    if idx == 0 {
        raw.trim_start_matches('\u{feff}').to_string()
    } else {
        raw.to_string()
    }
}
