/// Time primitives
///
/// The timeline is year-based. A `Year` is a plain integer; fractional or
/// non-numeric years in persisted data are treated as absent by the codec.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(pub i32);

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive year range driven by the timeline slider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct YearRange {
    pub min: Year,
    pub max: Year,
}

impl YearRange {
    pub fn new(min: Year, max: Year) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: Year) -> bool {
        self.min <= year && year <= self.max
    }

    pub fn clamp(&self, year: Year) -> Year {
        year.max(self.min).min(self.max)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: Year(0),
            max: Year(10_000),
        }
    }
}
