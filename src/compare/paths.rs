//! @ai:module:intent Parse result image locations `<technique>/<tag>/<scene>/<spp>_<replica>.exr`
//! @ai:module:layer domain
//! @ai:module:public_api ResultPathParser, CandidatePath
//! @ai:module:stateless true

use crate::error::Result;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

/// @ai:intent Coordinates of a result image found under a kind's results root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    pub technique: String,
    pub tag: String,
    pub scene: String,
    pub spp: u32,
    pub replica: u32,
    pub image: PathBuf,
}

/// @ai:intent Validates name components and extracts the sample count and replica
pub struct ResultPathParser {
    name_regex: Regex,
    image_regex: Regex,
}

impl ResultPathParser {
    /// @ai:effects pure
    pub fn new() -> Result<Self> {
        Ok(Self {
            name_regex: Regex::new(r"^[A-Za-z0-9_ ]+$")?,
            image_regex: Regex::new(r"^(\d+)_(\d+)\.exr$")?,
        })
    }

    /// @ai:intent Parse an image path relative to `root`; `None` when it does not follow the layout
    /// @ai:effects pure
    pub fn parse(&self, root: &Path, image: &Path) -> Option<CandidatePath> {
        let relative = image.strip_prefix(root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        let [technique, tag, scene, file] = parts.as_slice() else {
            return None;
        };
        if ![technique, tag, scene]
            .iter()
            .all(|name| self.name_regex.is_match(name))
        {
            return None;
        }
        let captures = self.image_regex.captures(file)?;
        let spp: u32 = captures[1].parse().ok()?;
        if spp == 0 {
            return None;
        }
        Some(CandidatePath {
            technique: technique.to_string(),
            tag: tag.to_string(),
            scene: scene.to_string(),
            spp,
            replica: captures[2].parse().ok()?,
            image: image.to_path_buf(),
        })
    }
}
