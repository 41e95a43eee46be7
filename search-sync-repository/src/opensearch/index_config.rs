//! OpenSearch index settings and mappings for the package index.

use serde_json::{json, Value};

/// Get the index settings and mappings for the package search index.
///
/// The `name` field uses `search_as_you_type` so the mobile client gets
/// type-ahead suggestions without extra analyzers; `link` is stored but not
/// indexed, and `count` stays numeric for sorting.
pub fn index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "id": {
                    "type": "long"
                },
                "name": {
                    "type": "search_as_you_type",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "link": {
                    "type": "keyword",
                    "index": false
                },
                "count": {
                    "type": "long"
                },
                "indexed_at": {
                    "type": "date"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = index_settings();

        assert!(settings["settings"]["number_of_shards"].is_number());
        assert!(settings["settings"]["number_of_replicas"].is_number());

        assert_eq!(settings["mappings"]["properties"]["id"]["type"], "long");
        assert_eq!(
            settings["mappings"]["properties"]["name"]["type"],
            "search_as_you_type"
        );
        assert_eq!(
            settings["mappings"]["properties"]["link"]["index"],
            false
        );
        assert_eq!(settings["mappings"]["properties"]["count"]["type"], "long");
    }
}
