use std::collections::BTreeMap;

use serde::Serialize;

use crate::{convert_str, ConvertErrorKind};

/// Result shape handed to a scripting host.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HostMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HostMetadata {
    pub title: String,
    pub artist: String,
}

impl HostResponse {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            metadata: None,
            files: None,
            error: Some(error),
        }
    }
}

/// Converts raw map JSON into sanitized file names and rendered documents.
pub fn convert_for_host(json: &str) -> HostResponse {
    if json.trim().is_empty() {
        return HostResponse::failure("No map data provided".to_string());
    }

    let converted = match convert_str(json) {
        Ok(converted) => converted,
        Err(e) if e.kind == ConvertErrorKind::Input => {
            return HostResponse::failure(format!("Invalid map data: {e}"));
        }
        Err(e) => return HostResponse::failure(format!("Conversion error: {e}")),
    };

    HostResponse {
        success: true,
        metadata: Some(HostMetadata {
            title: converted.title.clone(),
            artist: converted.artist.clone(),
        }),
        files: Some(converted.rendered_files().into_iter().collect()),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_lists_sanitized_files() {
        let json = r#"{
            "title": "Who?",
            "artist": "Me/You",
            "bpm": 120,
            "level": { "easy": 0, "normal": "-1", "hard": 3 },
            "map": { "hard": ["1,2,3,4"] }
        }"#;
        let response = convert_for_host(json);
        assert!(response.success);
        assert_eq!(
            response.metadata,
            Some(HostMetadata {
                title: "Who?".to_string(),
                artist: "Me/You".to_string(),
            })
        );
        let files = response.files.unwrap();
        let names: Vec<_> = files.keys().cloned().collect();
        assert_eq!(names, vec!["MeYou - Who (Sparebeat) [Hard].osu".to_string()]);
        assert!(files.values().all(|text| text.starts_with("osu file format v14")));
    }

    #[test]
    fn invalid_json_reports_error() {
        let response = convert_for_host("{ not json");
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("Invalid map data: E1001"));

        let response = convert_for_host("");
        assert_eq!(response.error.as_deref(), Some("No map data provided"));
    }

    #[test]
    fn response_serializes_like_the_host_expects() {
        let v = serde_json::to_value(convert_for_host("[1, 2]")).unwrap();
        assert_eq!(v["success"], false);
        assert!(v.get("files").is_none());
        assert!(v["error"].as_str().unwrap().contains("E1002"));
    }
}
