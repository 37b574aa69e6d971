use csv::StringRecord;

/// One positional record as read from a source file.
///
/// The engine never mutates a record; fields are addressed by raw column
/// index, resolved through the file's [`HeaderMap`](super::HeaderMap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    fields: StringRecord,
    line: u64,
}

impl RawRecord {
    pub(crate) fn new(fields: StringRecord, line: u64) -> Self {
        Self { fields, line }
    }

    /// Build a record from literal fields (line 0).
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fields: fields.into_iter().collect(),
            line: 0,
        }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx)
    }

    pub fn iter(&self) -> csv::StringRecordIter<'_> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 1-based line of the record in its source file (0 when synthetic).
    pub fn line(&self) -> u64 {
        self.line
    }
}
