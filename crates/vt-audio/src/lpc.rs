//! Linear prediction (Burg's method) and conversion of its poles to resonances.

use std::f64::consts::PI;

use nalgebra::{Complex, DMatrix};

/// Poles closer than this to 0 Hz or to the Nyquist frequency are ignored.
const EDGE_MARGIN_HZ: f64 = 50.0;

/// One vocal-tract resonance candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resonance {
    /// Centre frequency (Hz).
    pub frequency: f64,
    /// -3 dB bandwidth (Hz).
    pub bandwidth: f64,
}

/// Burg estimate of `order` prediction coefficients for `x`.
///
/// The returned `a` satisfies `x[n] ≈ Σ a[k-1] · x[n-k]` for `k` in
/// `1..=order`. `None` when the frame is silent, too short, or the recursion
/// runs out of energy before reaching `order`.
///
/// # Example
/// ```
/// use vt_audio::lpc::burg;
/// // a sinusoid obeys x[n] = 2cos(θ) x[n-1] - x[n-2]
/// let theta = 2.0 * std::f64::consts::PI * 0.05;
/// let x: Vec<f64> = (0..200).map(|i| (theta * f64::from(i)).sin()).collect();
/// let a = burg(&x, 2).unwrap();
/// assert!((a[0] - 2.0 * theta.cos()).abs() < 0.01);
/// assert!((a[1] + 1.0).abs() < 0.01);
/// ```
#[must_use]
pub fn burg(x: &[f64], order: usize) -> Option<Vec<f64>> {
    let n = x.len();
    if order == 0 || n <= order + 1 {
        return None;
    }
    if x.iter().map(|v| v * v).sum::<f64>() <= 0.0 {
        return None;
    }

    let mut a = vec![0.0; order];
    let mut prev = vec![0.0; order];
    // Forward and backward prediction errors, both of length n - 1 at the start.
    let mut fwd = x[..n - 1].to_vec();
    let mut bwd = x[1..].to_vec();

    for i in 0..order {
        let len = n - 1 - i;
        let (num, den) = fwd[..len]
            .iter()
            .zip(&bwd[..len])
            .fold((0.0, 0.0), |(num, den), (f, b)| {
                (num + f * b, den + f * f + b * b)
            });
        if den <= 0.0 {
            return None;
        }

        let k = 2.0 * num / den;
        a[i] = k;
        for (j, aj) in a[..i].iter_mut().enumerate() {
            *aj = prev[j] - k * prev[i - 1 - j];
        }

        if i + 1 < order {
            prev[..=i].copy_from_slice(&a[..=i]);
            for j in 0..len - 1 {
                fwd[j] -= k * bwd[j];
                bwd[j] = bwd[j + 1] - k * fwd[j + 1];
            }
        }
    }

    Some(a)
}

/// Roots of the monic polynomial `c[0] + c[1] z + ... + c[m-1] z^(m-1) + z^m`,
/// as eigenvalues of its companion matrix.
fn monic_roots(c: &[f64]) -> Vec<Complex<f64>> {
    let m = c.len();
    if m == 0 {
        return Vec::new();
    }
    let companion = DMatrix::<f64>::from_fn(m, m, |row, col| {
        if col == m - 1 {
            -c[row]
        } else if row == col + 1 {
            1.0
        } else {
            0.0
        }
    });
    companion.complex_eigenvalues().iter().copied().collect()
}

/// Resonances of the all-pole filter `1 / (1 - Σ a[k-1] z^-k)` sampled at
/// `sample_rate`, sorted by frequency.
///
/// Poles outside the unit circle are reflected inside first. Each conjugate
/// pair yields one resonance; real poles and poles within 50 Hz of 0 or of
/// the Nyquist frequency are dropped.
#[must_use]
pub fn resonances(a: &[f64], sample_rate: f64) -> Vec<Resonance> {
    let m = a.len();
    // z^m - a1 z^(m-1) - ... - am, constant term first
    let coeffs: Vec<f64> = (0..m).map(|i| -a[m - 1 - i]).collect();
    let nyquist = sample_rate / 2.0;

    let mut found: Vec<Resonance> = monic_roots(&coeffs)
        .into_iter()
        .map(|z| {
            let r = z.norm();
            if r > 1.0 { z / (r * r) } else { z }
        })
        .filter(|z| z.im >= 0.0)
        .filter_map(|z| {
            let frequency = z.im.atan2(z.re).abs() * nyquist / PI;
            if frequency < EDGE_MARGIN_HZ || frequency > nyquist - EDGE_MARGIN_HZ {
                return None;
            }
            let power = z.norm_sqr();
            let bandwidth = if power > 0.0 {
                -power.ln() * nyquist / PI
            } else {
                nyquist
            };
            Some(Resonance {
                frequency,
                bandwidth,
            })
        })
        .collect();

    found.sort_by(|x, y| x.frequency.total_cmp(&y.frequency));
    found
}
