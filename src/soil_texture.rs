use crate::error::{SoilError, require_positive};
use crate::infiltration::GreenAmpt;
use crate::water_balance::RootZone;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

const BUILTIN_TABLE: &str = include_str!("../soil_parameters.toml");
const FALLBACK_SOIL: &str = "loam";

// Hydraulic properties of one soil texture class (SI units)
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct SoilTexture {
    pub ks: f64,             // Saturated hydraulic conductivity [m/s]
    pub psi: f64,            // Wetting front suction head [m]
    pub porosity: f64,       // Total porosity [-]
    pub field_capacity: f64, // Water content at field capacity [-]
    pub wilting_point: f64,  // Water content at wilting point [-]
}

impl SoilTexture {
    /// Green-Ampt parameters for a soil starting at `initial_water_content`.
    pub fn green_ampt(&self, initial_water_content: f64) -> Result<GreenAmpt, SoilError> {
        let delta_theta = self.porosity - initial_water_content;
        require_positive("delta_theta", delta_theta)?;
        GreenAmpt::new(self.ks, self.psi, delta_theta)
    }

    /// Root-zone bucket of the given depth for this texture.
    pub fn root_zone(&self, root_zone_depth: f64) -> Result<RootZone, SoilError> {
        RootZone::new(self.field_capacity, self.wilting_point, root_zone_depth)
    }
}

/// Named texture classes loaded from TOML, one table per texture.
#[derive(Clone, Debug)]
pub struct TextureTable {
    textures: HashMap<String, SoilTexture>,
}

impl TextureTable {
    /// Table shipped with the crate (`soil_parameters.toml`)
    pub fn builtin() -> Result<Self, SoilError> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, SoilError> {
        let textures: HashMap<String, SoilTexture> =
            toml::from_str(toml_str).map_err(|e| SoilError::ParseFailed(e.to_string()))?;
        Ok(TextureTable { textures })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SoilError> {
        let path = path.as_ref();
        let toml_str = fs::read_to_string(path)
            .map_err(|e| SoilError::LoadFailed(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&toml_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    /// Look up a texture by name ("Silt Loam" and "silt_loam" are the same).
    /// Empty or unknown names fall back to loam.
    pub fn get(&self, soil_name: &str) -> Result<&SoilTexture, SoilError> {
        let mut key = soil_name.trim().to_lowercase().replace([' ', '-'], "_");
        if key.is_empty() {
            key = FALLBACK_SOIL.to_string();
        }

        if let Some(texture) = self.textures.get(&key) {
            return Ok(texture);
        }

        warn!("Unknown soil texture '{}', falling back to {}", soil_name, FALLBACK_SOIL);
        self.textures
            .get(FALLBACK_SOIL)
            .ok_or_else(|| SoilError::UnknownSoil(soil_name.to_string()))
    }
}
