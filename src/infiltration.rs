// Green-Ampt cumulative infiltration.
//
// The implicit relation F - C·ln(1 + F/C) = Ks·t, with C = ψ·Δθ, is inverted
// for F at each requested time with a guarded Newton iteration. Every time
// point is solved on its own, starting from Philip's two-term approximation
// F₀ = Ks·t + sqrt(2·C·Ks·t).
//
// Units must be consistent: with Ks in m/s, ψ in m and t in s, F is in m.
use crate::error::{SoilError, require_non_negative, require_positive};
use serde::Deserialize;
use tracing::debug;

/// Absolute residual tolerance; also the floor applied to a negative iterate
pub const RESIDUAL_TOLERANCE: f64 = 1e-6;
/// Newton iteration budget per time point
pub const MAX_ITERATIONS: usize = 100;
/// Below this |g'(F)| the iteration stops and keeps the current iterate
pub const MIN_DERIVATIVE: f64 = 1e-9;

// Green-Ampt soil parameters
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct GreenAmpt {
    pub ks: f64,          // Saturated hydraulic conductivity [m/s]
    pub psi: f64,         // Wetting front suction head [m]
    pub delta_theta: f64, // Moisture deficit θs - θi [-]
}

/// Outcome of the Newton iteration at one time point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfiltrationPoint {
    pub time: f64,
    /// Cumulative infiltration depth F
    pub depth: f64,
    /// g(F) at the returned depth
    pub residual: f64,
    pub iterations: usize,
    /// `false` when the iteration budget ran out or the derivative went flat
    pub converged: bool,
}

impl GreenAmpt {
    pub fn new(ks: f64, psi: f64, delta_theta: f64) -> Result<Self, SoilError> {
        let params = GreenAmpt {
            ks,
            psi,
            delta_theta,
        };
        params.validate()?;
        Ok(params)
    }

    pub(crate) fn validate(&self) -> Result<(), SoilError> {
        require_positive("ks", self.ks)?;
        require_positive("psi", self.psi)?;
        require_positive("delta_theta", self.delta_theta)?;
        Ok(())
    }

    /// C = ψ·Δθ
    pub fn suction_storage(&self) -> f64 {
        self.psi * self.delta_theta
    }

    fn residual(&self, depth: f64, kst: f64) -> f64 {
        let c = self.suction_storage();
        depth - c * (1.0 + depth / c).ln() - kst
    }

    /// Infiltration capacity `Ks·(1 + C/F)` once `depth` has infiltrated.
    /// Unbounded at F = 0.
    pub fn rate(&self, depth: f64) -> f64 {
        if depth <= 0.0 {
            return f64::INFINITY;
        }
        self.ks * (1.0 + self.suction_storage() / depth)
    }

    /// Cumulative infiltration at a single time `t >= 0`.
    pub fn cumulative(&self, t: f64) -> Result<InfiltrationPoint, SoilError> {
        self.validate()?;
        require_non_negative("time", t)?;
        Ok(self.newton(t))
    }

    fn newton(&self, t: f64) -> InfiltrationPoint {
        // Defined boundary value, no iteration
        if t == 0.0 {
            return InfiltrationPoint {
                time: t,
                depth: 0.0,
                residual: 0.0,
                iterations: 0,
                converged: true,
            };
        }

        let c = self.suction_storage();
        let kst = self.ks * t;
        let (depth, residual, iterations, converged) =
            self.iterate(kst + (2.0 * c * kst).sqrt(), kst, MAX_ITERATIONS);

        if !converged {
            debug!(
                time = t,
                depth,
                residual,
                iterations,
                "Green-Ampt iteration stopped before reaching tolerance"
            );
        }

        InfiltrationPoint {
            time: t,
            depth,
            residual,
            iterations,
            converged,
        }
    }

    // Newton iteration on g(F) from `depth`. Returns (F, g(F), iterations, converged).
    fn iterate(&self, mut depth: f64, kst: f64, max_iterations: usize) -> (f64, f64, usize, bool) {
        let c = self.suction_storage();
        let mut g = self.residual(depth, kst);
        let mut converged = g.abs() < RESIDUAL_TOLERANCE;
        let mut iterations = 0;

        while !converged && iterations < max_iterations {
            let slope = depth / (depth + c);
            if slope.abs() < MIN_DERIVATIVE {
                debug!(depth, "Green-Ampt derivative too flat, keeping iterate");
                break;
            }
            depth -= g / slope;
            if depth < 0.0 {
                depth = RESIDUAL_TOLERANCE;
            }
            iterations += 1;
            g = self.residual(depth, kst);
            converged = g.abs() < RESIDUAL_TOLERANCE;
        }

        (depth, g, iterations, converged)
    }

    /// Solve every time point independently. `times` need not be sorted.
    pub fn solve_detailed(&self, times: &[f64]) -> Result<Vec<InfiltrationPoint>, SoilError> {
        self.validate()?;
        for &t in times {
            require_non_negative("time", t)?;
        }
        Ok(times.iter().map(|&t| self.newton(t)).collect())
    }

    /// Cumulative infiltration depths, one per entry of `times`.
    pub fn solve(&self, times: &[f64]) -> Result<Vec<f64>, SoilError> {
        Ok(self
            .solve_detailed(times)?
            .into_iter()
            .map(|p| p.depth)
            .collect())
    }
}

/// Free-function form of [`GreenAmpt::solve`].
pub fn solve(ks: f64, psi: f64, delta_theta: f64, times: &[f64]) -> Result<Vec<f64>, SoilError> {
    GreenAmpt::new(ks, psi, delta_theta)?.solve(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn loam() -> GreenAmpt {
        GreenAmpt::new(1e-5, 0.1, 0.2).unwrap()
    }

    #[test]
    fn zero_time_is_exactly_zero() {
        assert_eq!(solve(1e-5, 0.1, 0.2, &[0.0]).unwrap(), vec![0.0]);
        let point = loam().cumulative(0.0).unwrap();
        assert_eq!(point.iterations, 0);
        assert!(point.converged);
    }

    // Bisection on [0, F₀]; g(0) = -Ks·t < 0 and g(F₀) > 0
    fn reference_root(params: &GreenAmpt, t: f64) -> f64 {
        let kst = params.ks * t;
        let (mut lo, mut hi) = (0.0, kst + (2.0 * params.suction_storage() * kst).sqrt());
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if params.residual(mid, kst) > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        0.5 * (lo + hi)
    }

    #[test]
    fn depth_grows_over_widely_spaced_times() {
        let times = [0.0, 1.0, 60.0, 600.0, 3600.0, 21600.0, 86400.0, 864000.0];
        let depths = loam().solve(&times).unwrap();
        for pair in depths.windows(2) {
            assert!(pair[1] >= pair[0], "{} then {}", pair[0], pair[1]);
        }
        assert!(depths.iter().all(|&f| f >= 0.0));
    }

    #[test]
    fn fine_grid_dips_stay_within_tolerance_bound() {
        // The residual stopping rule accepts iterates slightly above the root,
        // so on a fine grid F can step back by at most tol / g'(root).
        let params = loam();
        let c = params.suction_storage();
        let times: Vec<f64> = (1..=2000).map(|i| i as f64 * 0.01).collect();
        let points = params.solve_detailed(&times).unwrap();

        let mut prev_root = 0.0;
        let mut prev: Option<(f64, f64)> = None;
        for p in &points {
            let root = reference_root(&params, p.time);
            assert!(root >= prev_root, "exact solution decreased at t = {}", p.time);
            prev_root = root;

            let bound = RESIDUAL_TOLERANCE * (root + c) / root;
            assert!(p.converged);
            assert!(p.depth >= root - 1e-12, "t = {} below root", p.time);
            assert!(p.depth - root <= bound + 1e-12, "t = {} error too large", p.time);

            if let Some((prev_depth, prev_bound)) = prev {
                assert!(
                    prev_depth - p.depth <= prev_bound + 1e-12,
                    "dip at t = {} exceeds tolerance bound",
                    p.time
                );
            }
            prev = Some((p.depth, bound));
        }
    }

    #[test]
    fn negative_iterate_is_clamped() {
        let params = loam();
        let c = params.suction_storage();
        // Slope is -1 at F = -C/2, so the first step lands further below zero
        let (depth, _, iterations, _) = params.iterate(-0.5 * c, 0.01 * c, 1);
        assert_eq!(iterations, 1);
        assert_eq!(depth, RESIDUAL_TOLERANCE);

        // The clamped iterate then converges to the positive root
        let (depth, residual, _, converged) = params.iterate(-0.5 * c, 0.01 * c, MAX_ITERATIONS);
        assert!(converged);
        assert!(depth > 0.0);
        assert!(residual.abs() < RESIDUAL_TOLERANCE);
    }

    #[test]
    fn flat_derivative_stops_iteration() {
        let params = loam();
        // g'(1e-12) = 1e-12 / (1e-12 + 0.02) < MIN_DERIVATIVE while |g| ≈ 1e-3
        let (depth, residual, iterations, converged) = params.iterate(1e-12, 1e-3, MAX_ITERATIONS);
        assert_eq!(iterations, 0);
        assert!(!converged);
        assert_eq!(depth, 1e-12);
        assert!(residual.abs() > RESIDUAL_TOLERANCE);
    }

    #[test]
    fn exhausted_budget_reports_not_converged() {
        let params = loam();
        // Far from the root (≈ 1.08) a single step cannot reach the tolerance
        let (depth, residual, iterations, converged) = params.iterate(100.0, 1.0, 1);
        assert_eq!(iterations, 1);
        assert!(!converged);
        assert!(residual.abs() >= RESIDUAL_TOLERANCE);
        assert!(depth > 1.0);

        // Zero budget returns the starting iterate untouched
        let (depth, _, iterations, converged) = params.iterate(100.0, 1.0, 0);
        assert_eq!((depth, iterations, converged), (100.0, 0, false));
    }

    #[test]
    fn one_day_rate_close_to_ks() {
        let params = loam();
        let point = params.cumulative(86400.0).unwrap();
        assert!(point.converged);
        assert!(point.residual.abs() < RESIDUAL_TOLERANCE);
        assert_relative_eq!(params.rate(point.depth), params.ks, max_relative = 0.05);
    }

    #[test]
    fn rate_tends_to_ks() {
        let params = loam();
        let early = params.rate(params.cumulative(3600.0).unwrap().depth);
        let late = params.rate(params.cumulative(1e8).unwrap().depth);
        assert!(late < early);
        assert_relative_eq!(late, params.ks, max_relative = 1e-3);
        assert!(params.rate(0.0).is_infinite());
    }

    #[test]
    fn satisfies_implicit_equation() {
        let params = GreenAmpt::new(2.8e-7, 0.2088, 0.3).unwrap();
        let c = params.suction_storage();
        for t in [1800.0, 7200.0, 172800.0] {
            let p = params.cumulative(t).unwrap();
            let lhs = p.depth - c * (1.0 + p.depth / c).ln();
            assert!((lhs - params.ks * t).abs() < RESIDUAL_TOLERANCE);
        }
    }

    #[test]
    fn unsorted_times_solved_independently() {
        let params = loam();
        let shuffled = params.solve(&[86400.0, 0.0, 3600.0]).unwrap();
        let single = params.solve(&[3600.0]).unwrap();
        assert_eq!(shuffled[2], single[0]);
        assert_eq!(shuffled[1], 0.0);
        assert!(shuffled[0] > shuffled[2]);
    }

    #[test]
    fn rejects_invalid_arguments() {
        assert!(matches!(
            solve(0.0, 0.1, 0.2, &[1.0]),
            Err(SoilError::NotPositive { name: "ks", .. })
        ));
        assert!(matches!(
            solve(1e-5, 0.1, 0.2, &[10.0, -1.0]),
            Err(SoilError::Negative { name: "time", .. })
        ));
        assert!(matches!(
            solve(1e-5, 0.1, 0.2, &[f64::INFINITY]),
            Err(SoilError::NonFinite { name: "time", .. })
        ));
    }

    #[test]
    fn empty_times_give_empty_result() {
        assert!(loam().solve(&[]).unwrap().is_empty());
    }
}
