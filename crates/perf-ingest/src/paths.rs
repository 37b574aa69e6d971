//! Source file locations.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Suffix appended to an entity identifier to name its detail file.
pub const DETAIL_SUFFIX: &str = "-perform.csv";

/// Builds summary and detail file paths from a data directory prefix.
///
/// Paths are formed by plain concatenation: the data directory is used as a
/// prefix and must carry its own trailing separator when one is wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    data_dir: OsString,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<OsString>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &OsStr {
        &self.data_dir
    }

    /// `<data_dir><name>`
    pub fn summary_path(&self, name: impl AsRef<OsStr>) -> PathBuf {
        let mut path = self.data_dir.clone();
        path.push(name);
        PathBuf::from(path)
    }

    /// `<data_dir><identifier>-perform.csv`
    pub fn detail_path(&self, identifier: &str) -> PathBuf {
        let mut path = self.data_dir.clone();
        path.push(identifier);
        path.push(DETAIL_SUFFIX);
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_without_inserting_separators() {
        let paths = DataPaths::new("/data/");
        assert_eq!(paths.summary_path("list.csv"), PathBuf::from("/data/list.csv"));
        assert_eq!(
            paths.detail_path("SN1"),
            PathBuf::from("/data/SN1-perform.csv")
        );

        let bare = DataPaths::new("/data");
        assert_eq!(bare.summary_path("list.csv"), PathBuf::from("/datalist.csv"));
        assert_eq!(bare.detail_path("SN1"), PathBuf::from("/dataSN1-perform.csv"));
    }

    #[test]
    fn empty_prefix_is_relative() {
        let paths = DataPaths::new("");
        assert_eq!(paths.detail_path("a"), PathBuf::from("a-perform.csv"));
    }
}
