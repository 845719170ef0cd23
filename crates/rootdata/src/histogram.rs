//! Public histogram bin type returned by `RootFile::read_histogram`.

/// One histogram bin. Bin 0 is the underflow bin, the last bin the overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinPars {
    /// Bin content.
    pub content: f64,
    /// Sum of squared weights, 0 if the histogram stores none.
    pub sumw2: f64,
    /// Lower bin edge; `-inf` for the underflow bin.
    pub lowedge: f64,
}

impl Default for BinPars {
    fn default() -> Self {
        Self { content: 0.0, sumw2: 0.0, lowedge: 0.0 }
    }
}

impl BinPars {
    /// Statistical error, `sqrt(sumw2)`.
    pub fn error(&self) -> f64 {
        self.sumw2.sqrt()
    }
}

/// Center of bin `i`: `-inf` for underflow, `+inf` for overflow.
pub fn bin_center(bins: &[BinPars], i: usize) -> f64 {
    if i == 0 {
        f64::NEG_INFINITY
    } else if i + 1 >= bins.len() {
        f64::INFINITY
    } else {
        0.5 * (bins[i].lowedge + bins[i + 1].lowedge)
    }
}
