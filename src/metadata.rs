// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX gesture model metadata parsing.
//!
//! Gesture models may carry YAML-style key/value pairs in their ONNX custom
//! metadata. Every field is optional; a model without metadata gets the defaults.

use std::collections::HashMap;

use crate::error::{GestureError, Result};
use crate::gesture::{GESTURE_COUNT, GestureLabel};

/// Frames fed to the network per inference when the model does not say otherwise.
pub const DEFAULT_FRAMES_PER_GESTURE: usize = 5;

/// Metadata keys read from the ONNX custom metadata map.
pub const METADATA_KEYS: [&str; 6] = [
    "description",
    "author",
    "date",
    "version",
    "frames_per_gesture",
    "names",
];

/// Metadata extracted from a gesture classifier model.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub description: String,
    pub author: String,
    /// Export date.
    pub date: String,
    pub version: String,
    /// Frames the network consumes per inference.
    pub frames_per_gesture: usize,
    /// Output index to label name mapping.
    pub names: HashMap<usize, String>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: String::new(),
            date: String::new(),
            version: String::new(),
            frames_per_gesture: DEFAULT_FRAMES_PER_GESTURE,
            names: HashMap::new(),
        }
    }
}

impl ModelMetadata {
    /// Build metadata from the custom metadata map of an ONNX session.
    ///
    /// Individual keys are joined into one YAML document; a single combined
    /// `metadata` value is also accepted.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if a present field is malformed.
    pub fn from_onnx_metadata(metadata_map: &HashMap<String, String>) -> Result<Self> {
        if let Some(combined) = metadata_map.get("metadata") {
            return Self::from_yaml_str(combined);
        }

        let yaml = METADATA_KEYS
            .iter()
            .filter_map(|key| metadata_map.get(*key).map(|v| format!("{key}: {v}")))
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_yaml_str(&yaml)
    }

    /// Parse metadata from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if `frames_per_gesture` is not a positive integer.
    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let mut metadata = Self::default();

        for line in yaml_str.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim().trim_matches('\'').trim_matches('"');
                match key.trim() {
                    "description" => metadata.description = value.to_string(),
                    "author" => metadata.author = value.to_string(),
                    "date" => metadata.date = value.to_string(),
                    "version" => metadata.version = value.to_string(),
                    "frames_per_gesture" => {
                        metadata.frames_per_gesture = match value.parse::<usize>() {
                            Ok(n) if n > 0 => n,
                            _ => {
                                return Err(GestureError::MetadataError(format!(
                                    "Invalid frames_per_gesture value: {value}"
                                )));
                            }
                        };
                    }
                    _ => {}
                }
            }
        }

        metadata.names = Self::parse_names(yaml_str);
        Ok(metadata)
    }

    /// Parse `names` in either `{0: 'none', 1: 'others'}` or indented block form.
    fn parse_names(yaml_str: &str) -> HashMap<usize, String> {
        let mut names = HashMap::new();

        if let Some(start) = yaml_str.find("names:") {
            let after = yaml_str[start + 6..].trim_start();
            if let Some(dict) = after.strip_prefix('{')
                && let Some(end) = dict.find('}')
            {
                for entry in dict[..end].split(',') {
                    insert_name(&mut names, entry);
                }
                return names;
            }
        }

        let mut in_block = false;
        for line in yaml_str.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("names:") {
                in_block = true;
                continue;
            }
            if !in_block || trimmed.is_empty() {
                continue;
            }
            if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
                break;
            }
            insert_name(&mut names, trimmed);
        }

        names
    }

    /// Check declared `names` against the fixed gesture label order.
    ///
    /// A model without `names` passes. Otherwise it must list all
    /// [`GESTURE_COUNT`] labels, each at its [`GestureLabel`] index.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` on a count mismatch or a misplaced label.
    pub fn validate_labels(&self) -> Result<()> {
        if self.names.is_empty() {
            return Ok(());
        }
        if self.names.len() != GESTURE_COUNT {
            return Err(GestureError::MetadataError(format!(
                "Model declares {} labels, expected {GESTURE_COUNT}",
                self.names.len()
            )));
        }
        for label in GestureLabel::ALL {
            let name = self.label_name(label.index()).unwrap_or_default();
            if name.parse::<GestureLabel>().ok() != Some(label) {
                return Err(GestureError::MetadataError(format!(
                    "Label {} is '{name}', expected '{label}'",
                    label.index()
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn num_labels(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn label_name(&self, idx: usize) -> Option<&str> {
        self.names.get(&idx).map(String::as_str)
    }
}

fn insert_name(names: &mut HashMap<usize, String>, entry: &str) {
    if let Some((key, value)) = entry.split_once(':')
        && let Ok(idx) = key.trim().parse::<usize>()
    {
        let name = value.trim().trim_matches('\'').trim_matches('"');
        names.insert(idx, name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_METADATA: &str = r"
description: Hand gesture classifier
author: Gesture Team
date: '2025-06-02'
version: 1.4.0
frames_per_gesture: 8
names:
  0: none
  1: others
  2: bloom
";

    #[test]
    fn test_parse_metadata() {
        let metadata = ModelMetadata::from_yaml_str(SAMPLE_METADATA).unwrap();
        assert_eq!(metadata.description, "Hand gesture classifier");
        assert_eq!(metadata.date, "2025-06-02");
        assert_eq!(metadata.frames_per_gesture, 8);
        assert_eq!(metadata.num_labels(), 3);
        assert_eq!(metadata.label_name(2), Some("bloom"));
    }

    #[test]
    fn test_parse_inline_names() {
        let metadata = ModelMetadata::from_yaml_str("names: {0: 'none', 1: 'others'}").unwrap();
        assert_eq!(metadata.label_name(1), Some("others"));
        assert_eq!(metadata.frames_per_gesture, DEFAULT_FRAMES_PER_GESTURE);
    }

    #[test]
    fn test_invalid_frames_per_gesture() {
        let err = ModelMetadata::from_yaml_str("frames_per_gesture: zero").unwrap_err();
        assert!(matches!(err, GestureError::MetadataError(_)));
        assert!(ModelMetadata::from_yaml_str("frames_per_gesture: 0").is_err());
    }

    #[test]
    fn test_from_onnx_metadata_keys() {
        let mut map = HashMap::new();
        map.insert("frames_per_gesture".to_string(), "3".to_string());
        map.insert("names".to_string(), "{0: 'none', 1: 'others', 2: 'bloom'}".to_string());
        let metadata = ModelMetadata::from_onnx_metadata(&map).unwrap();
        assert_eq!(metadata.frames_per_gesture, 3);
        assert_eq!(metadata.num_labels(), 3);
    }

    fn full_names() -> String {
        let entries: Vec<String> = GestureLabel::ALL
            .iter()
            .map(|label| format!("{}: '{label}'", label.index()))
            .collect();
        format!("names: {{{}}}", entries.join(", "))
    }

    #[test]
    fn test_validate_labels() {
        assert!(ModelMetadata::default().validate_labels().is_ok());

        let metadata = ModelMetadata::from_yaml_str(&full_names()).unwrap();
        assert_eq!(metadata.num_labels(), GESTURE_COUNT);
        assert!(metadata.validate_labels().is_ok());

        let short = ModelMetadata::from_yaml_str(SAMPLE_METADATA).unwrap();
        assert!(matches!(short.validate_labels(), Err(GestureError::MetadataError(_))));

        let swapped = full_names().replace("2: 'bloom'", "2: 'punch'");
        let metadata = ModelMetadata::from_yaml_str(&swapped).unwrap();
        let err = metadata.validate_labels().unwrap_err();
        assert!(err.to_string().contains("expected 'bloom'"));
    }

    #[test]
    fn test_default_metadata() {
        let metadata = ModelMetadata::default();
        assert_eq!(metadata.frames_per_gesture, 5);
        assert!(metadata.names.is_empty());
    }
}
