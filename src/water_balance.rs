use crate::advisory::{Advisory, Solved};
use crate::error::{SoilError, require_non_negative, require_positive, require_series};
use serde::Deserialize;
use tracing::{debug, warn};

// Root zone bucket: capacity bounds derived from soil moisture fractions
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct RootZone {
    pub field_capacity: f64,  // Volumetric water content at field capacity [-]
    pub wilting_point: f64,   // Volumetric water content at wilting point [-]
    pub root_zone_depth: f64, // Rooting depth [mm]
}

// Daily outputs, one entry per day in day order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaterBalanceSeries {
    pub storage: Vec<f64>,     // End-of-day storage [mm]
    pub percolation: Vec<f64>, // Water above field capacity drained that day [mm]
    pub actual_et: Vec<f64>,   // Evapotranspiration actually extracted [mm]
}

impl WaterBalanceSeries {
    fn with_capacity(n: usize) -> Self {
        WaterBalanceSeries {
            storage: Vec::with_capacity(n),
            percolation: Vec::with_capacity(n),
            actual_et: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn total_percolation(&self) -> f64 {
        self.percolation.iter().sum()
    }

    pub fn total_actual_et(&self) -> f64 {
        self.actual_et.iter().sum()
    }
}

impl RootZone {
    pub fn new(
        field_capacity: f64,
        wilting_point: f64,
        root_zone_depth: f64,
    ) -> Result<Self, SoilError> {
        let zone = RootZone {
            field_capacity,
            wilting_point,
            root_zone_depth,
        };
        zone.validate()?;
        Ok(zone)
    }

    pub(crate) fn validate(&self) -> Result<(), SoilError> {
        let (wp, fc) = (self.wilting_point, self.field_capacity);
        if !(wp.is_finite() && fc.is_finite() && 0.0 < wp && wp < fc && fc < 1.0) {
            return Err(SoilError::FractionOrder {
                wilting_point: wp,
                field_capacity: fc,
            });
        }
        require_positive("root_zone_depth", self.root_zone_depth)?;
        Ok(())
    }

    pub fn field_capacity_storage(&self) -> f64 {
        self.field_capacity * self.root_zone_depth
    }

    pub fn wilting_point_storage(&self) -> f64 {
        self.wilting_point * self.root_zone_depth
    }

    // Plant-available water between the two bounds [mm]
    pub fn available_water_capacity(&self) -> f64 {
        self.field_capacity_storage() - self.wilting_point_storage()
    }

    /// Propagate root-zone storage day by day.
    ///
    /// Each day precipitation is added, anything above field capacity percolates,
    /// then reference ET is extracted without taking storage below the wilting
    /// point. An `initial_storage` outside the bounds raises
    /// `Advisory::InitialStorageOutOfBounds` and is used as given for day one.
    pub fn run(
        &self,
        precip: &[f64],
        eto: &[f64],
        initial_storage: f64,
    ) -> Result<Solved<WaterBalanceSeries>, SoilError> {
        self.validate()?;
        if precip.len() != eto.len() {
            return Err(SoilError::LengthMismatch {
                precip: precip.len(),
                eto: eto.len(),
            });
        }
        require_series("precip", precip)?;
        require_series("eto", eto)?;
        require_non_negative("initial_storage", initial_storage)?;

        let s_fc = self.field_capacity_storage();
        let s_wp = self.wilting_point_storage();

        let mut advisories = Vec::new();
        if initial_storage < s_wp || initial_storage > s_fc {
            warn!(
                "Initial storage {:.2} outside [{:.2}, {:.2}]; proceeding with it",
                initial_storage, s_wp, s_fc
            );
            advisories.push(Advisory::InitialStorageOutOfBounds {
                initial_storage,
                wilting_point_storage: s_wp,
                field_capacity_storage: s_fc,
            });
        }

        let mut series = WaterBalanceSeries::with_capacity(precip.len());
        let mut storage = initial_storage;

        for (&p, &et) in precip.iter().zip(eto) {
            storage += p;

            let percolation = if storage > s_fc {
                let excess = storage - s_fc;
                storage = s_fc;
                excess
            } else {
                0.0
            };

            let extraction = et.min((storage - s_wp).max(0.0));
            storage -= extraction;
            storage = storage.max(s_wp);

            series.storage.push(storage);
            series.percolation.push(percolation);
            series.actual_et.push(extraction);
        }

        debug!(
            days = series.len(),
            percolation = series.total_percolation(),
            actual_et = series.total_actual_et(),
            "water balance complete"
        );
        Ok(Solved::new(series, advisories))
    }
}

/// Free-function form of [`RootZone::run`], returning `(storage, percolation)`.
pub fn run(
    precip: &[f64],
    eto: &[f64],
    field_capacity: f64,
    wilting_point: f64,
    root_zone_depth: f64,
    initial_storage: f64,
) -> Result<Solved<(Vec<f64>, Vec<f64>)>, SoilError> {
    let zone = RootZone::new(field_capacity, wilting_point, root_zone_depth)?;
    let solved = zone.run(precip, eto, initial_storage)?;
    Ok(solved.map(|s| (s.storage, s.percolation)))
}
