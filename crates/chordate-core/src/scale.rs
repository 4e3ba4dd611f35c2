/// Affine mapping from a numeric domain onto a numeric range.
///
/// Matches the d3 `scaleLinear().domain([d0, d1]).range([r0, r1])` contract
/// for in-domain and out-of-domain inputs (no clamping). A degenerate domain
/// (`d0 == d1`) maps every input to the range midpoint instead of dividing
/// by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(d0: f64, d1: f64, r0: f64, r1: f64) -> Self {
        Self { d0, d1, r0, r1 }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.r0, self.r1)
    }

    pub fn map(&self, value: f64) -> f64 {
        if self.d0 == self.d1 {
            return self.r0 + (self.r1 - self.r0) * 0.5;
        }
        let t = (value - self.d0) / (self.d1 - self.d0);
        self.r0 + t * (self.r1 - self.r0)
    }
}

/// Largest chart radius that fits a `height` x `width` viewport, reduced by
/// `offset` to leave room for labels outside the ring. Callers own keeping
/// the offset smaller than the half-extent.
pub fn radius_from_dimensions(height: f64, width: f64, offset: f64) -> f64 {
    let half = (height / 2.0).min(width / 2.0);
    half - offset
}
