use sparebeat_converter::{convert_for_host, HostResponse};
use wasm_bindgen::prelude::*;

/// Convert a Sparebeat map (raw JSON text) into osu!mania documents.
///
/// Resolves to `{ success, metadata: { title, artist }, files: { name: text } }`
/// or `{ success: false, error }`. Conversion failures are reported in the
/// object; only a failed hand-off to JS rejects.
#[wasm_bindgen(js_name = convertSparebeatMap)]
pub fn convert_sparebeat_map(json: &str) -> Result<JsValue, JsValue> {
    let response = convert_for_host(json);
    serde_wasm_bindgen::to_value(&response).map_err(JsValue::from)
}

/// Same conversion, returned as JSON text.
#[wasm_bindgen(js_name = convertSparebeatMapJson)]
pub fn convert_sparebeat_map_json(json: &str) -> String {
    response_json(&convert_for_host(json))
}

fn response_json(response: &HostResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"error":{}}}"#,
            serde_json::Value::String(format!("Conversion error: {e}"))
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_entry_point_reports_files() {
        let out = convert_sparebeat_map_json(
            r#"{"title":"T","artist":"A","bpm":150,"level":{"normal":2},"map":{"normal":["1"]}}"#,
        );
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["metadata"]["title"], "T");
        let files = v["files"].as_object().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("A - T (Sparebeat) [Normal].osu"));
    }

    #[test]
    fn json_entry_point_reports_errors() {
        let v: serde_json::Value =
            serde_json::from_str(&convert_sparebeat_map_json("not json")).unwrap();
        assert_eq!(v["success"], false);
        assert!(v["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid map data: E1001"));
    }
}
