use domain::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::collections::HashSet;

/// A projected output document. Keys are the requested paths, in request order.
pub type Document = Map<String, Json>;

/// Ordered, de-duplicated list of dotted paths to extract from each match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Projection {
    paths: Vec<String>,
}

impl Projection {
    /// Keeps the first occurrence of every path.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| seen.insert(p.clone()))
            .collect();
        Self { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Build the output document for one record.
    ///
    /// Paths that do not resolve are left out entirely rather than set to null.
    pub fn apply(&self, record: &Record) -> Document {
        let mut doc = Document::new();
        for path in &self.paths {
            if let Some(value) = record.get(path) {
                doc.insert(path.clone(), value.clone());
            }
        }
        doc
    }
}

impl From<Vec<String>> for Projection {
    fn from(paths: Vec<String>) -> Self {
        Projection::new(paths)
    }
}

impl From<Projection> for Vec<String> {
    fn from(projection: Projection) -> Self {
        projection.paths
    }
}

pub fn project(projection: &Projection, record: &Record) -> Document {
    projection.apply(record)
}
