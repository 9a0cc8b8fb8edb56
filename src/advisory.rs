// Non-fatal diagnostics returned next to a solver result. The caller decides
// whether to log, ignore or escalate them.

/// Advisory raised while a solve proceeds with best-effort semantics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advisory {
    /// Explicit diffusion scheme run with α > 0.5
    UnstableDiffusion { alpha: f64 },
    /// Initial root-zone storage outside [WP, FC] storage
    InitialStorageOutOfBounds {
        initial_storage: f64,
        wilting_point_storage: f64,
        field_capacity_storage: f64,
    },
}

impl Advisory {
    /// Short stable identifier, usable as a metric label or log key
    pub fn code(&self) -> &'static str {
        match self {
            Advisory::UnstableDiffusion { .. } => "unstable-diffusion",
            Advisory::InitialStorageOutOfBounds { .. } => "initial-storage-out-of-bounds",
        }
    }
}

/// A computed value together with the advisories raised producing it
#[derive(Debug, Clone, PartialEq)]
pub struct Solved<T> {
    pub value: T,
    pub advisories: Vec<Advisory>,
}

impl<T> Solved<T> {
    pub fn new(value: T, advisories: Vec<Advisory>) -> Self {
        Solved { value, advisories }
    }

    /// No advisories were raised
    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }

    pub fn has(&self, code: &str) -> bool {
        self.advisories.iter().any(|a| a.code() == code)
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Solved<U> {
        Solved {
            value: f(self.value),
            advisories: self.advisories,
        }
    }
}
