use crate::advisory::{Advisory, Solved};
use crate::error::{SoilError, require_finite, require_positive};
use nalgebra::DVector;
use serde::Deserialize;
use tracing::{debug, warn};

/// Largest α for which the explicit scheme is guaranteed stable
pub const STABILITY_LIMIT: f64 = 0.5;

// Explicit finite difference parameters for 1-D heat conduction in soil
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ThermalDiffusion {
    pub diffusivity: f64, // Thermal diffusivity [m²/s]
    pub dt: f64,          // Time step [s]
    pub dz: f64,          // Node spacing [m]
}

impl ThermalDiffusion {
    pub fn new(diffusivity: f64, dt: f64, dz: f64) -> Result<Self, SoilError> {
        let params = ThermalDiffusion {
            diffusivity,
            dt,
            dz,
        };
        params.validate()?;
        Ok(params)
    }

    pub(crate) fn validate(&self) -> Result<(), SoilError> {
        require_positive("diffusivity", self.diffusivity)?;
        require_positive("dt", self.dt)?;
        require_positive("dz", self.dz)?;
        Ok(())
    }

    /// α = diffusivity·dt/dz²
    pub fn stability_coefficient(&self) -> f64 {
        self.diffusivity * self.dt / self.dz.powi(2)
    }

    pub fn is_stable(&self) -> bool {
        self.stability_coefficient() <= STABILITY_LIMIT
    }

    /// Largest time step keeping α within the stability limit for this dz
    pub fn max_stable_dt(&self) -> f64 {
        STABILITY_LIMIT * self.dz.powi(2) / self.diffusivity
    }

    /// Depth of each internal node below the surface boundary [m]
    pub fn node_depths(&self, n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64 * self.dz).collect()
    }

    /// Advance the internal-node temperatures `steps` times with the surface and
    /// bottom temperatures held fixed. Returns a new profile; `profile` is untouched.
    ///
    /// An unstable α does not abort the solve; the result carries an
    /// `Advisory::UnstableDiffusion` and the caller decides what to do with it.
    pub fn advance(
        &self,
        profile: &DVector<f64>,
        surface_temp: f64,
        bottom_temp: f64,
        steps: usize,
    ) -> Result<Solved<DVector<f64>>, SoilError> {
        self.validate()?;
        if profile.is_empty() {
            return Err(SoilError::EmptyProfile);
        }
        if steps == 0 {
            return Err(SoilError::ZeroSteps);
        }
        require_finite("surface_temp", surface_temp)?;
        require_finite("bottom_temp", bottom_temp)?;
        for &t in profile.iter() {
            require_finite("profile", t)?;
        }

        let alpha = self.stability_coefficient();
        let mut advisories = Vec::new();
        if alpha > STABILITY_LIMIT {
            warn!(
                "Diffusion coefficient alpha = {:.4} exceeds {}; result may be unstable",
                alpha, STABILITY_LIMIT
            );
            advisories.push(Advisory::UnstableDiffusion { alpha });
        }

        let nz = profile.len();
        let mut t_old = profile.clone();
        let mut t_new = DVector::<f64>::zeros(nz);

        for _ in 0..steps {
            for i in 0..nz {
                // Boundary values stand in for the missing neighbours
                let above = if i == 0 { surface_temp } else { t_old[i - 1] };
                let below = if i == nz - 1 { bottom_temp } else { t_old[i + 1] };
                t_new[i] = t_old[i] + alpha * (below - 2.0 * t_old[i] + above);
            }
            std::mem::swap(&mut t_old, &mut t_new);
        }

        debug!(nodes = nz, steps, alpha, "soil temperature profile advanced");
        Ok(Solved::new(t_old, advisories))
    }
}

/// Plain-slice form of [`ThermalDiffusion::advance`].
pub fn advance(
    profile: &[f64],
    surface_temp: f64,
    bottom_temp: f64,
    diffusivity: f64,
    dt: f64,
    dz: f64,
    steps: usize,
) -> Result<Solved<Vec<f64>>, SoilError> {
    let params = ThermalDiffusion::new(diffusivity, dt, dz)?;
    let solved = params.advance(
        &DVector::from_column_slice(profile),
        surface_temp,
        bottom_temp,
        steps,
    )?;
    Ok(solved.map(|t| t.as_slice().to_vec()))
}
