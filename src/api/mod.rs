//! Endpoint families.
//!
//! Thin, typed descriptor builders over the dispatcher, grouped by
//! resource: `client.containers().logs(..)`, `client.images().pull(..)`.
//! Each operation builds one [`crate::Endpoint`] and hands it to the
//! matching `run` wrapper; all protocol behavior lives below this layer.

mod containers;
mod exec;
mod images;
mod swarm;
mod system;

pub use containers::{
    AttachOptions, Containers, ListContainersOptions, LogsOptions, RemoveContainerOptions,
};
pub use exec::Exec;
pub use images::{BuildOptions, Images, ListImagesOptions};
pub use swarm::Swarm;
pub use system::{EventsOptions, System};

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Builds a query string from the given pairs; empty input yields an empty
/// string.
pub(crate) fn query(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    format!("?{}", serializer.finish())
}

/// Encodes the daemon's `filters` query parameter (a JSON map of key to
/// value list).
pub(crate) fn filters_param(
    filters: &HashMap<String, Vec<String>>,
) -> Result<Option<String>> {
    if filters.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(filters)
        .map(Some)
        .map_err(Error::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pairs_yield_no_query() {
        assert_eq!(query(&[]), "");
    }

    #[test]
    fn pairs_are_url_encoded() {
        let q = query(&[
            ("all", "1".to_string()),
            ("filters", r#"{"label":["a=b"]}"#.to_string()),
        ]);
        assert_eq!(q, "?all=1&filters=%7B%22label%22%3A%5B%22a%3Db%22%5D%7D");
    }

    #[test]
    fn filters_param_skips_empty_maps() {
        assert_eq!(filters_param(&HashMap::new()).unwrap(), None);
    }

    #[test]
    fn filters_param_encodes_json() {
        let mut filters = HashMap::new();
        filters.insert("dangling".to_string(), vec!["true".to_string()]);
        let encoded = filters_param(&filters).unwrap().unwrap();
        assert_eq!(encoded, r#"{"dangling":["true"]}"#);
    }
}
