//! # Wavelet Decomposition
//!
//! Multi-level 2D discrete wavelet transform used as the front end of the
//! wavelet hash.
//!
//! Each level filters the current approximation along axis 0 (rows index)
//! and then along axis 1 (columns index), keeping every second sample. The
//! signal is extended with half-sample symmetric padding, so an axis of
//! length `n` filtered with a filter of length `f` produces
//! `(n + f - 1) / 2` coefficients.
//!
//! Band naming follows the usual convention:
//!
//! - `horizontal` (cH): detail along axis 0, approximation along axis 1
//! - `vertical` (cV): approximation along axis 0, detail along axis 1
//! - `diagonal` (cD): detail along both axes

use ndarray::{Array2, Axis};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const HAAR: [f64; 2] = [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2];

const DB2: [f64; 4] = [
    -0.12940952255092145,
    0.22414386804185735,
    0.836516303737469,
    0.48296291314469025,
];

const DB3: [f64; 6] = [
    0.035226291882100656,
    -0.08544127388224149,
    -0.13501102001039084,
    0.4598775021193313,
    0.8068915093133388,
    0.3326705529509569,
];

const DB4: [f64; 8] = [
    -0.010597401784997278,
    0.032883011666982945,
    0.030841381835986965,
    -0.18703481171888114,
    -0.02798376941698385,
    0.6308807679295904,
    0.7148465705525415,
    0.23037781330885523,
];

const COIF1: [f64; 6] = [
    -0.01565572813546454,
    -0.0727326195128539,
    0.38486484686420286,
    0.8525720202122554,
    0.3378976624578092,
    -0.0727326195128539,
];

/// Supported orthogonal wavelet families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wavelet {
    Haar,
    Db2,
    Db3,
    Db4,
    Sym2,
    Sym3,
    Coif1,
}

impl Wavelet {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Haar => "haar",
            Self::Db2 => "db2",
            Self::Db3 => "db3",
            Self::Db4 => "db4",
            Self::Sym2 => "sym2",
            Self::Sym3 => "sym3",
            Self::Coif1 => "coif1",
        }
    }

    /// Decomposition low-pass filter
    pub fn dec_lo(&self) -> &'static [f64] {
        match self {
            Self::Haar => &HAAR,
            // sym2 and sym3 coincide with db2 and db3
            Self::Db2 | Self::Sym2 => &DB2,
            Self::Db3 | Self::Sym3 => &DB3,
            Self::Db4 => &DB4,
            Self::Coif1 => &COIF1,
        }
    }

    /// Decomposition high-pass filter (quadrature mirror of `dec_lo`)
    pub fn dec_hi(&self) -> Vec<f64> {
        let lo = self.dec_lo();
        let len = lo.len();
        (0..len)
            .map(|k| {
                let v = lo[len - 1 - k];
                if k % 2 == 0 {
                    -v
                } else {
                    v
                }
            })
            .collect()
    }

    pub fn filter_len(&self) -> usize {
        self.dec_lo().len()
    }
}

impl FromStr for Wavelet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "haar" | "db1" => Ok(Self::Haar),
            "db2" => Ok(Self::Db2),
            "db3" => Ok(Self::Db3),
            "db4" => Ok(Self::Db4),
            "sym2" => Ok(Self::Sym2),
            "sym3" => Ok(Self::Sym3),
            "coif1" => Ok(Self::Coif1),
            _ => Err(Error::InvalidConfiguration(format!(
                "unknown wavelet '{}', expected one of: haar, db1, db2, db3, db4, sym2, sym3, coif1",
                s
            ))),
        }
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detail subbands of one decomposition level
#[derive(Debug, Clone, PartialEq)]
pub struct DetailBands {
    pub horizontal: Array2<f64>,
    pub vertical: Array2<f64>,
    pub diagonal: Array2<f64>,
}

/// Output of a multi-level decomposition
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTree {
    /// Approximation at the coarsest level
    pub approximation: Array2<f64>,

    /// Detail bands ordered from the coarsest level to the finest
    pub details: Vec<DetailBands>,
}

impl CoefficientTree {
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    pub fn coarsest_details(&self) -> Option<&DetailBands> {
        self.details.first()
    }

    /// (rows, cols) of the coarsest approximation
    pub fn approximation_shape(&self) -> (usize, usize) {
        self.approximation.dim()
    }
}

/// Number of coefficients produced for an input of length `n`
pub fn output_len(n: usize, filter_len: usize) -> usize {
    (n + filter_len - 1) / 2
}

/// Deepest level that still shrinks an axis of length `n`
///
/// Past this depth every further level keeps the same length and only
/// rescales the coefficients.
pub fn max_level(n: usize, filter_len: usize) -> usize {
    let mut len = n;
    let mut level = 0;
    while len > 0 && output_len(len, filter_len) < len {
        len = output_len(len, filter_len);
        level += 1;
    }
    level
}

// Half-sample symmetric extension: x[-1] = x[0], x[n] = x[n-1]
#[inline]
fn symmetric_index(k: isize, n: isize) -> usize {
    let period = 2 * n;
    let m = k.rem_euclid(period);
    if m >= n {
        (period - 1 - m) as usize
    } else {
        m as usize
    }
}

/// Single-level 1D transform of one signal
pub fn dwt(signal: &[f64], wavelet: Wavelet) -> (Vec<f64>, Vec<f64>) {
    let lo = wavelet.dec_lo();
    let hi = wavelet.dec_hi();
    let n = signal.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let out = output_len(n, lo.len());
    let mut approx = Vec::with_capacity(out);
    let mut detail = Vec::with_capacity(out);

    for o in 0..out {
        let i = (1 + 2 * o) as isize;
        let mut a = 0.0;
        let mut d = 0.0;
        for (j, (&l, &h)) in lo.iter().zip(hi.iter()).enumerate() {
            let x = signal[symmetric_index(i - j as isize, n as isize)];
            a += l * x;
            d += h * x;
        }
        approx.push(a);
        detail.push(d);
    }

    (approx, detail)
}

fn dwt_axis(data: &Array2<f64>, wavelet: Wavelet, axis: Axis) -> (Array2<f64>, Array2<f64>) {
    let n = data.len_of(axis);
    let mut shape = [data.nrows(), data.ncols()];
    shape[axis.index()] = output_len(n, wavelet.filter_len());

    let mut approx = Array2::<f64>::zeros(shape);
    let mut detail = Array2::<f64>::zeros(shape);
    let mut buffer = Vec::with_capacity(n);

    for ((lane, mut a_lane), mut d_lane) in data
        .lanes(axis)
        .into_iter()
        .zip(approx.lanes_mut(axis))
        .zip(detail.lanes_mut(axis))
    {
        buffer.clear();
        buffer.extend(lane.iter().copied());
        let (a, d) = dwt(&buffer, wavelet);
        for (dst, v) in a_lane.iter_mut().zip(a) {
            *dst = v;
        }
        for (dst, v) in d_lane.iter_mut().zip(d) {
            *dst = v;
        }
    }

    (approx, detail)
}

/// Single-level 2D transform: (approximation, details)
pub fn dwt2(data: &Array2<f64>, wavelet: Wavelet) -> (Array2<f64>, DetailBands) {
    let (lo0, hi0) = dwt_axis(data, wavelet, Axis(0));
    let (ll, lh) = dwt_axis(&lo0, wavelet, Axis(1));
    let (hl, hh) = dwt_axis(&hi0, wavelet, Axis(1));

    (
        ll,
        DetailBands {
            horizontal: hl,
            vertical: lh,
            diagonal: hh,
        },
    )
}

/// Multi-level 2D decomposition
///
/// Every requested level is computed, the coarseness of the final
/// approximation depends on it.
pub fn wavedec2(data: &Array2<f64>, wavelet: Wavelet, levels: usize) -> Result<CoefficientTree> {
    if levels == 0 {
        return Err(Error::InvalidConfiguration(
            "Decomposition level must be at least 1".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(Error::Decode("Cannot decompose an empty pixel grid".to_string()));
    }
    let deepest = max_level(data.nrows().max(data.ncols()), wavelet.filter_len());
    if levels > deepest {
        return Err(Error::InvalidConfiguration(format!(
            "Decomposition level {} exceeds the maximum of {} for a {}x{} grid with {}",
            levels,
            deepest,
            data.ncols(),
            data.nrows(),
            wavelet
        )));
    }

    let mut current = data.to_owned();
    let mut details = Vec::new();
    for _ in 0..levels {
        let (approx, bands) = dwt2(&current, wavelet);
        details.push(bands);
        current = approx;
    }
    details.reverse();

    Ok(CoefficientTree {
        approximation: current,
        details,
    })
}
