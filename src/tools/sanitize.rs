//! Result sanitation before model hand-off.

/// Recursively remove every `annotations` attribute from a value.
///
/// Annotations carry tool-process provenance (internal object identifiers
/// and audience hints) that is not meant for the model or the end user.
/// Stripping them is a data-minimization contract, applied to every result
/// item regardless of nesting depth.
pub fn strip_annotations(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(key, _)| key != "annotations")
                .map(|(key, inner)| (key, strip_annotations(inner)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(strip_annotations).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_top_level_annotations() {
        let sanitized = strip_annotations(json!({
            "type": "text",
            "text": "created box",
            "annotations": {"audience": ["assistant"]}
        }));
        assert_eq!(
            sanitized,
            json!({"type": "text", "text": "created box"})
        );
    }

    #[test]
    fn strips_nested_annotations() {
        let sanitized = strip_annotations(json!({
            "type": "resource",
            "resource": {
                "uri": "rhino://objects/1",
                "annotations": {"sourceObjectId": "1"},
                "children": [
                    {"name": "edge", "annotations": {"internal": true}}
                ]
            }
        }));
        assert_eq!(
            sanitized,
            json!({
                "type": "resource",
                "resource": {
                    "uri": "rhino://objects/1",
                    "children": [{"name": "edge"}]
                }
            })
        );
    }

    #[test]
    fn leaves_scalars_and_clean_values_untouched() {
        assert_eq!(strip_annotations(json!("text")), json!("text"));
        assert_eq!(strip_annotations(json!(7)), json!(7));
        assert_eq!(
            strip_annotations(json!({"type": "text", "text": "ok"})),
            json!({"type": "text", "text": "ok"})
        );
    }
}
