mod advisory;
mod config;
mod error;
pub mod infiltration;
pub mod soil_temp;
mod soil_texture;
pub mod water_balance;

pub use advisory::{Advisory, Solved};
pub use config::SolverConfig;
pub use error::SoilError;
pub use infiltration::{GreenAmpt, InfiltrationPoint};
pub use soil_temp::ThermalDiffusion;
pub use soil_texture::{SoilTexture, TextureTable};
pub use water_balance::{RootZone, WaterBalanceSeries};
