use crate::error::SoilError;
use crate::infiltration::GreenAmpt;
use crate::soil_temp::ThermalDiffusion;
use crate::water_balance::RootZone;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Solver parameters read from a TOML file. Every section is optional.
///
/// ```toml
/// [diffusion]
/// diffusivity = 5.0e-7
/// dt = 1800.0
/// dz = 0.05
///
/// [infiltration]
/// ks = 9.444e-7
/// psi = 0.0889
/// delta_theta = 0.25
///
/// [water_balance]
/// field_capacity = 0.27
/// wilting_point = 0.117
/// root_zone_depth = 600.0
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    pub diffusion: Option<ThermalDiffusion>,
    pub infiltration: Option<GreenAmpt>,
    pub water_balance: Option<RootZone>,
}

impl SolverConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SoilError> {
        let config: SolverConfig =
            toml::from_str(toml_str).map_err(|e| SoilError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SoilError> {
        let path = path.as_ref();
        let toml_str = fs::read_to_string(path)
            .map_err(|e| SoilError::LoadFailed(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&toml_str)
    }

    // Same checks as the constructors
    fn validate(&self) -> Result<(), SoilError> {
        if let Some(diffusion) = &self.diffusion {
            diffusion.validate()?;
        }
        if let Some(infiltration) = &self.infiltration {
            infiltration.validate()?;
        }
        if let Some(zone) = &self.water_balance {
            zone.validate()?;
        }
        Ok(())
    }
}
