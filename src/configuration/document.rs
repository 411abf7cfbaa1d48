//! @ai:module:intent Persisted shape of a benchmark configuration
//! @ai:module:layer infrastructure
//! @ai:module:public_api ConfigDocument, RendererEntry, SceneEntry, TechniqueEntry
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Configuration file: scenes grouped by renderer, versions grouped by technique
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub renderers: Vec<RendererEntry>,
    #[serde(default)]
    pub filters: Vec<TechniqueEntry>,
    #[serde(default)]
    pub samplers: Vec<TechniqueEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererEntry {
    pub name: String,
    /// Absolute renderer executable, only present in run documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub scenes: Vec<SceneEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub name: String,
    /// Absolute scene file, only present in run documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub spps: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueEntry {
    pub name: String,
    /// Absent means the default version only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,
}
