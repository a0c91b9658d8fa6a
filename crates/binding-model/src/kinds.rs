use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} {name:?}")]
pub struct UnknownName {
    pub what: &'static str,
    pub name: String,
}

/// Shader stage an entry point is declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vertex,
    Fragment,
    Compute,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Vertex, Stage::Fragment, Stage::Compute];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| UnknownName {
                what: "stage",
                name: s.to_string(),
            })
    }
}

/// A category of module-scope resource variable.
///
/// The set is closed: every kind the suite can declare is listed here, and the emitters match on it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Uniform,
    Storage,
    Texture2d,
    Texture2dArray,
    Texture3d,
    TextureCube,
    TextureMultisampled2d,
    TextureDepth2d,
    TextureDepthCube,
    Sampler,
    SamplerComparison,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Uniform,
        ResourceKind::Storage,
        ResourceKind::Texture2d,
        ResourceKind::Texture2dArray,
        ResourceKind::Texture3d,
        ResourceKind::TextureCube,
        ResourceKind::TextureMultisampled2d,
        ResourceKind::TextureDepth2d,
        ResourceKind::TextureDepthCube,
        ResourceKind::Sampler,
        ResourceKind::SamplerComparison,
    ];

    /// Kinds used for the first resource of a collision pair.
    pub const CLASS_A: [ResourceKind; 3] = [
        ResourceKind::Storage,
        ResourceKind::Texture2d,
        ResourceKind::Uniform,
    ];

    /// Kinds used for the second resource of a collision pair.
    pub const CLASS_B: [ResourceKind; 5] = [
        ResourceKind::Sampler,
        ResourceKind::SamplerComparison,
        ResourceKind::TextureDepth2d,
        ResourceKind::TextureMultisampled2d,
        ResourceKind::Texture3d,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Uniform => "uniform",
            ResourceKind::Storage => "storage",
            ResourceKind::Texture2d => "texture_2d",
            ResourceKind::Texture2dArray => "texture_2d_array",
            ResourceKind::Texture3d => "texture_3d",
            ResourceKind::TextureCube => "texture_cube",
            ResourceKind::TextureMultisampled2d => "texture_multisampled_2d",
            ResourceKind::TextureDepth2d => "texture_depth_2d",
            ResourceKind::TextureDepthCube => "texture_depth_cube",
            ResourceKind::Sampler => "sampler",
            ResourceKind::SamplerComparison => "sampler_comparison",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownName {
                what: "resource kind",
                name: s.to_string(),
            })
    }
}
