use vt_core::config::FormantSettings;
use vt_core::traits::FormantTrack;

use crate::error::AudioError;
use crate::lpc::{burg, resonances};
use crate::signal::Signal;

/// Gaussian analysis window, zero at its edges.
///
/// `w[i] = (exp(-48 (i - mid)² / (n + 1)²) - e) / (1 - e)` with `e = exp(-12)`.
fn gaussian_window(n: usize) -> Vec<f64> {
    let edge = (-12.0_f64).exp();
    let mid = (n as f64 - 1.0) / 2.0;
    let denom = (n as f64 + 1.0).powi(2);
    (0..n)
        .map(|i| {
            let d = i as f64 - mid;
            ((-48.0 * d * d / denom).exp() - edge) / (1.0 - edge)
        })
        .collect()
}

/// Formant frequencies sampled on a regular frame grid.
///
/// Frame `i` is centred at `first_time + i * time_step`. Each frame holds
/// `max_formants` frequencies in Hz; NaN marks an undefined slot.
#[derive(Clone, Debug)]
pub struct BurgTrack {
    frames: Vec<Vec<f64>>,
    first_time: f64,
    time_step: f64,
    max_formants: usize,
}

impl BurgTrack {
    /// Track formants in `signal` with Burg LPC.
    ///
    /// 1. downsample to twice the formant ceiling (when the signal is faster)
    /// 2. pre-emphasise
    /// 3. slide a Gaussian window of `2 * window_length` seconds every
    ///    `time_step` (`window_length / 4` when the step is 0)
    /// 4. fit `2 * max_formants` LPC coefficients per frame, keep the lowest
    ///    `max_formants` resonances under the ceiling
    ///
    /// A signal shorter than one window gives an empty track.
    ///
    /// # Errors
    /// Returns [`AudioError::Fft`] if resampling fails.
    pub fn analyze(signal: &Signal, settings: &FormantSettings) -> Result<Self, AudioError> {
        let max_formants = settings.max_formants;
        let ceiling = settings.max_formant_hz;
        let time_step = if settings.time_step > 0.0 {
            settings.time_step
        } else {
            settings.window_length / 4.0
        };

        let target_rate = 2.0 * ceiling;
        let resampled;
        let mut sound = signal;
        if signal.sample_rate > target_rate {
            resampled = signal.resampled(target_rate)?;
            sound = &resampled;
        }
        let sound = if settings.pre_emphasis_hz > 0.0 {
            sound.pre_emphasis(settings.pre_emphasis_hz)
        } else {
            sound.clone()
        };

        let dx = 1.0 / sound.sample_rate;
        let x1 = 0.5 * dx;
        let duration = sound.duration();
        let window_duration = 2.0 * settings.window_length;
        let window_samples = (window_duration / dx).floor() as usize;
        let half = window_samples / 2;

        if duration < window_duration || window_samples < 2 {
            log::debug!("signal of {duration:.3}s is shorter than one analysis window");
            return Ok(Self {
                frames: Vec::new(),
                first_time: x1,
                time_step,
                max_formants,
            });
        }

        let frame_count = 1 + ((duration - window_duration) / time_step).floor() as usize;
        let first_time = x1 + 0.5 * (duration - dx - (frame_count - 1) as f64 * time_step);
        let window = gaussian_window(window_samples);
        let last = sound.samples.len() - 1;

        let frames = (0..frame_count)
            .map(|i| {
                let t = first_time + i as f64 * time_step;
                let left = ((t - x1) / dx).floor() as isize;
                let start = (left + 1 - half as isize).max(0) as usize;
                let end = ((left + half as isize).max(0) as usize).min(last);
                let frame: Vec<f64> = sound.samples[start..=end.max(start)]
                    .iter()
                    .zip(&window)
                    .map(|(s, w)| s * w)
                    .collect();

                let mut values: Vec<f64> = burg(&frame, 2 * max_formants)
                    .map(|a| {
                        resonances(&a, sound.sample_rate)
                            .into_iter()
                            .filter(|r| {
                                r.frequency < ceiling
                                    && r.bandwidth > 0.0
                                    && r.bandwidth < ceiling
                                    && r.bandwidth < 2.0 * r.frequency
                            })
                            .take(max_formants)
                            .map(|r| r.frequency)
                            .collect()
                    })
                    .unwrap_or_default();
                values.resize(max_formants, f64::NAN);
                values
            })
            .collect();

        Ok(Self {
            frames,
            first_time,
            time_step,
            max_formants,
        })
    }

    /// Number of analysis frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Centre time of frame `frame`.
    #[must_use]
    pub fn frame_time(&self, frame: usize) -> f64 {
        self.first_time + frame as f64 * self.time_step
    }
}

impl FormantTrack for BurgTrack {
    /// Linear interpolation between the two neighbouring frames. An undefined
    /// neighbour is skipped; both undefined gives `None`. Times more than half
    /// a step outside the frame grid are undefined.
    fn value_at(&self, formant: usize, time: f64) -> Option<f64> {
        if formant == 0 || formant > self.max_formants || self.frames.is_empty() {
            return None;
        }
        let position = (time - self.first_time) / self.time_step;
        let n = self.frames.len();
        if !position.is_finite() || position < -0.5 || position > n as f64 - 0.5 {
            return None;
        }

        let position = position.max(0.0);
        let index = (position.floor() as usize).min(n - 1);
        let frac = position - index as f64;
        let v0 = self.frames[index][formant - 1];
        let v1 = self
            .frames
            .get(index + 1)
            .map_or(v0, |frame| frame[formant - 1]);

        match (v0.is_nan(), v1.is_nan()) {
            (true, true) => None,
            (true, false) => Some(v1),
            (false, true) => Some(v0),
            (false, false) => Some(v0 + (v1 - v0) * frac),
        }
    }
}
