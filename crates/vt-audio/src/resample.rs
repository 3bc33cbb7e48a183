use realfft::RealFftPlanner;

use crate::error::AudioError;

/// Zero padding on each side, in input samples, to keep the circular FFT
/// from wrapping the end of the signal onto its start.
const PAD: usize = 1000;

/// Resample `samples` from `from_rate` to `to_rate` by spectral truncation.
///
/// The whole (padded) signal goes through one forward real FFT; bins above the
/// lower of the two Nyquist frequencies are dropped, and an inverse FFT of the
/// new length produces the output. This is an ideal low-pass, so downsampling
/// needs no separate anti-aliasing filter.
///
/// Output length is `round(len * to_rate / from_rate)`.
///
/// # Errors
/// Returns [`AudioError::Fft`] if realfft rejects a buffer.
///
/// # Example
/// ```
/// use vt_audio::resample::resample;
/// let out = resample(&vec![0.0; 441], 44100.0, 11025.0).unwrap();
/// assert_eq!(out.len(), 110);
/// ```
pub fn resample(samples: &[f64], from_rate: f64, to_rate: f64) -> Result<Vec<f64>, AudioError> {
    let ratio = to_rate / from_rate;
    if samples.is_empty() || (ratio - 1.0).abs() < 1e-9 {
        return Ok(samples.to_vec());
    }

    let n_in = samples.len() + 2 * PAD;
    let n_out = (n_in as f64 * ratio).round() as usize;
    let target = (samples.len() as f64 * ratio).round() as usize;
    if n_out < 2 || target == 0 {
        return Ok(Vec::new());
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n_in);
    let inverse = planner.plan_fft_inverse(n_out);

    let mut input = forward.make_input_vec();
    input[PAD..PAD + samples.len()].copy_from_slice(samples);
    let mut spectrum = forward.make_output_vec();
    forward
        .process(&mut input, &mut spectrum)
        .map_err(|e| AudioError::Fft(e.to_string()))?;

    let mut truncated = inverse.make_input_vec();
    let keep = truncated.len().min(spectrum.len());
    truncated[..keep].copy_from_slice(&spectrum[..keep]);
    // DC and (even-length) Nyquist bins of a real signal have no imaginary part.
    truncated[0].im = 0.0;
    if n_out.is_multiple_of(2) {
        let nyquist = truncated.len() - 1;
        truncated[nyquist].im = 0.0;
        if ratio < 1.0 {
            truncated[nyquist].re = 0.0;
        }
    }

    let mut output = inverse.make_output_vec();
    inverse
        .process(&mut truncated, &mut output)
        .map_err(|e| AudioError::Fft(e.to_string()))?;

    // realfft is unnormalised: forward then inverse scales by the forward length.
    let scale = 1.0 / n_in as f64;
    let skip = (PAD as f64 * ratio).round() as usize;
    Ok(output
        .iter()
        .skip(skip)
        .take(target)
        .map(|v| v * scale)
        .collect())
}
