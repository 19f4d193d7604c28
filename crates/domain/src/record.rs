use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// A single dataset entity.
///
/// Records are JSON objects whose leaves are scalars. Keys may carry dots
/// themselves (`"movies.movie.title"`) or nest (`{"movies": {"movie": ...}}`);
/// [`lookup`] resolves a dotted path against either shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Json>);

impl Record {
    /// Build a record from a JSON value. Only objects are records.
    pub fn from_value(value: Json) -> Option<Self> {
        match value {
            Json::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Resolve a dotted field path.
    pub fn get(&self, path: &str) -> Option<&Json> {
        lookup(&self.0, path)
    }

    /// Every scalar leaf of the record as `(dotted path, value)`, in key order.
    ///
    /// Arrays are not scalars and are skipped together with their contents.
    pub fn leaves(&self) -> Vec<(String, &Json)> {
        let mut out = Vec::new();
        collect_leaves(&self.0, "", &mut out);
        out
    }
}

/// Returns `true` for strings, numbers, booleans and null.
pub fn is_scalar(value: &Json) -> bool {
    !matches!(value, Json::Array(_) | Json::Object(_))
}

/// Resolve a dotted path (e.g. `"movies.movie.title"`) against a JSON object.
///
/// At every level the remaining path is first tried as a literal key. If that
/// misses, the path is split at each dot in turn (shortest prefix first) and
/// the lookup continues inside the matching child object.
///
/// Returns `None` if no split resolves.
pub fn lookup<'a>(fields: &'a Map<String, Json>, path: &str) -> Option<&'a Json> {
    if let Some(value) = fields.get(path) {
        return Some(value);
    }

    for (idx, _) in path.match_indices('.') {
        let (head, tail) = (&path[..idx], &path[idx + 1..]);
        if let Some(Json::Object(child)) = fields.get(head) {
            if let Some(found) = lookup(child, tail) {
                return Some(found);
            }
        }
    }

    None
}

fn collect_leaves<'a>(
    fields: &'a Map<String, Json>,
    prefix: &str,
    out: &mut Vec<(String, &'a Json)>,
) {
    for (key, value) in fields {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Json::Object(child) => collect_leaves(child, &path, out),
            Json::Array(_) => {}
            scalar => out.push((path, scalar)),
        }
    }
}
