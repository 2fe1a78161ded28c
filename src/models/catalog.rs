use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ResolveError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantizedEntry {
    pub url: String,
    pub size: u64,
}

impl QuantizedEntry {
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        let mut parts = self.url.split('/');
        let _project = parts.next()?;
        let file_name = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(file_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantEntry {
    pub default: String,
    pub quantized: BTreeMap<String, QuantizedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    pub brief: String,
    pub license: String,
    pub default: String,
    pub variants: BTreeMap<String, VariantEntry>,
}

impl ModelEntry {
    pub fn variant(&self, key: &str) -> Option<&VariantEntry> {
        self.variants.get(key)
    }

    pub fn combinations(&self) -> Vec<String> {
        self.variants
            .iter()
            .flat_map(|(variant, entry)| {
                entry
                    .quantized
                    .keys()
                    .map(move |quantization| format!("{variant}:{quantization}"))
            })
            .collect()
    }

    pub fn default_combination(&self) -> Option<String> {
        let variant = self.variants.get(&self.default)?;
        variant
            .quantized
            .contains_key(&variant.default)
            .then(|| format!("{}:{}", self.default, variant.default))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog {
    models: BTreeMap<String, ModelEntry>,
}

impl Catalog {
    pub fn load(document: &str) -> Result<Self> {
        serde_json::from_str(document)
            .map_err(|error| ResolveError::MalformedCatalog(error.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let document = fs::read_to_string(path).map_err(|error| {
            ResolveError::MalformedCatalog(format!("read {}: {error}", path.display()))
        })?;
        let catalog = Self::load(&document)?;
        tracing::debug!(
            "Loaded {} models from {}",
            catalog.models.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn model(&self, name: &str) -> Option<&ModelEntry> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = (&str, &ModelEntry)> {
        self.models
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn consistency_check(&self) -> Vec<String> {
        self.models
            .iter()
            .filter(|(_, entry)| !entry.variants.contains_key(&entry.default))
            .map(|(name, _)| format!("{name} default missing"))
            .collect()
    }

    pub fn known_file_names(&self) -> BTreeSet<String> {
        self.models
            .values()
            .flat_map(|model| model.variants.values())
            .flat_map(|variant| variant.quantized.values())
            .filter_map(|entry| entry.file_name().map(str::to_owned))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "qwen": {
            "brief": "Qwen chat models",
            "license": "Apache-2.0",
            "default": "1.5b",
            "variants": {
                "7b": {
                    "default": "q4_1",
                    "quantized": {
                        "q4_1": { "url": "chatllm_quantized_qwen/qwen-7b-q4_1.bin", "size": 4800 },
                        "q8": { "url": "chatllm_quantized_qwen/qwen-7b.bin", "size": 8100 }
                    }
                },
                "1.5b": {
                    "default": "q8",
                    "quantized": {
                        "q8": { "url": "chatllm_quantized_qwen/qwen-1.5b.bin", "size": 1700 }
                    }
                }
            }
        },
        "bge": {
            "brief": "Embedding model",
            "license": "MIT",
            "default": "m3",
            "variants": {
                "m3": {
                    "default": "f16",
                    "quantized": {
                        "f16": { "url": "chatllm_quantized_bge/bge-m3.bin", "size": 1200, "note": "ignored" }
                    }
                }
            }
        },
        "orphan": {
            "brief": "Default points nowhere",
            "license": "MIT",
            "default": "large",
            "variants": {
                "small": {
                    "default": "q8",
                    "quantized": {
                        "q8": { "url": "proj/orphan-small.bin", "size": 10 }
                    }
                }
            }
        }
    }"#;

    pub(crate) fn sample() -> Catalog {
        Catalog::load(SAMPLE).expect("sample catalog parses")
    }

    #[test]
    fn models_iterate_in_name_order() {
        let names: Vec<_> = sample().models().map(|(name, _)| name.to_owned()).collect();
        assert_eq!(names, vec!["bge", "orphan", "qwen"]);
    }

    #[test]
    fn malformed_document_is_rejected() {
        let error = Catalog::load(r#"{ "qwen": { "brief": "x" } }"#).unwrap_err();
        assert!(matches!(error, ResolveError::MalformedCatalog(_)));

        let error = Catalog::load("not json").unwrap_err();
        assert!(matches!(error, ResolveError::MalformedCatalog(_)));
    }

    #[test]
    fn missing_file_is_malformed_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let error = Catalog::from_path(&dir.path().join("models.json")).unwrap_err();
        assert!(matches!(error, ResolveError::MalformedCatalog(_)));
    }

    #[test]
    fn consistency_check_reports_missing_default_variant() {
        assert_eq!(sample().consistency_check(), vec!["orphan default missing"]);
    }

    #[test]
    fn known_file_names_cover_every_quantization() {
        let names = sample().known_file_names();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec![
                "bge-m3.bin",
                "orphan-small.bin",
                "qwen-1.5b.bin",
                "qwen-7b-q4_1.bin",
                "qwen-7b.bin",
            ]
        );
    }

    #[test]
    fn combinations_and_default() {
        let catalog = sample();
        let qwen = catalog.model("qwen").unwrap();
        assert_eq!(qwen.combinations(), vec!["1.5b:q8", "7b:q4_1", "7b:q8"]);
        assert_eq!(qwen.default_combination().as_deref(), Some("1.5b:q8"));
        assert_eq!(catalog.model("orphan").unwrap().default_combination(), None);
    }

    #[test]
    fn file_name_requires_two_segments() {
        let entry = QuantizedEntry {
            url: "a/b/c".into(),
            size: 1,
        };
        assert_eq!(entry.file_name(), None);
        let entry = QuantizedEntry {
            url: "project/file.bin".into(),
            size: 1,
        };
        assert_eq!(entry.file_name(), Some("file.bin"));
    }
}
