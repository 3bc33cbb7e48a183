use crate::error::AudioError;
use crate::resample::resample;

/// Mono sampled signal. The first sample sits at `0.5 / sample_rate` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    /// Samples, nominally in `[-1, 1]`.
    pub samples: Vec<f64>,
    /// Sample rate (Hz).
    pub sample_rate: f64,
}

impl Signal {
    #[must_use]
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// First-order pre-emphasis `y[i] = x[i] - a * x[i-1]` with
    /// `a = exp(-2π · from_hz / sample_rate)`.
    ///
    /// Boosts the spectrum above `from_hz` by about 6 dB per octave.
    #[must_use]
    pub fn pre_emphasis(&self, from_hz: f64) -> Self {
        let alpha = (-2.0 * std::f64::consts::PI * from_hz / self.sample_rate).exp();
        let mut out = Vec::with_capacity(self.samples.len());
        let mut prev = 0.0;
        for (i, &s) in self.samples.iter().enumerate() {
            out.push(if i == 0 { s } else { s - alpha * prev });
            prev = s;
        }
        Self::new(out, self.sample_rate)
    }

    /// Band-limited resampling to `rate` Hz.
    ///
    /// # Errors
    /// Returns [`AudioError::Fft`] if the FFT cannot be processed.
    pub fn resampled(&self, rate: f64) -> Result<Self, AudioError> {
        Ok(Self::new(resample(&self.samples, self.sample_rate, rate)?, rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pre_emphasis_flattens_dc() {
        let sig = Signal::new(vec![1.0; 100], 10000.0);
        let out = sig.pre_emphasis(50.0);
        let alpha = (-2.0 * std::f64::consts::PI * 50.0 / 10000.0).exp();
        assert_abs_diff_eq!(out.samples[0], 1.0);
        assert_abs_diff_eq!(out.samples[50], 1.0 - alpha, epsilon = 1e-12);
        assert!(out.samples[50] < 0.04);
    }

    #[test]
    fn duration_from_length_and_rate() {
        let sig = Signal::new(vec![0.0; 441], 44100.0);
        assert_abs_diff_eq!(sig.duration(), 0.01, epsilon = 1e-12);
        assert!(Signal::new(Vec::new(), 8000.0).pre_emphasis(50.0).samples.is_empty());
    }
}
