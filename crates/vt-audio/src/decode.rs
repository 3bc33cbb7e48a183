use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;
use crate::signal::Signal;

/// Decode an audio file into a mono signal at its native sample rate.
///
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia. Multichannel audio is
/// averaged down to one channel.
///
/// # Errors
/// Returns an error if the file cannot be opened, probed or decoded, or if it
/// contains no samples.
///
/// # Example
/// ```no_run
/// use vt_audio::decode::decode_file;
/// let signal = decode_file("S001_reading.wav").unwrap();
/// println!("{} s", signal.duration());
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<Signal> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Cannot open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(format!("{}: {e}", path.display())))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedFormat(format!("{}: no audio track", path.display())))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::DecodeError(format!("{}: unknown sample rate", path.display())))?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeError(e.to_string()))?;

    let track_id = track.id;
    let mut samples: Vec<f64> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Audio decode packet error in {}: {e}", path.display());
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Audio decode frame error in {}: {e}", path.display());
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        // Downmix to mono
        samples.extend(
            buf.samples()
                .chunks(channels)
                .map(|frame| frame.iter().map(|&s| f64::from(s)).sum::<f64>() / channels as f64),
        );
    }

    if samples.is_empty() {
        return Err(AudioError::EmptySignal(path.display().to_string()).into());
    }

    log::debug!(
        "Decoded {} samples @ {sample_rate}Hz from {}",
        samples.len(),
        path.display()
    );

    Ok(Signal::new(samples, f64::from(sample_rate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, frames: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn decodes_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let frames: Vec<i16> = (0..1600).map(|i| if i % 2 == 0 { 8192 } else { -8192 }).collect();
        write_wav(&path, 1, &frames);

        let signal = decode_file(&path).unwrap();
        assert_eq!(signal.samples.len(), 1600);
        approx::assert_abs_diff_eq!(signal.sample_rate, 16000.0);
        approx::assert_abs_diff_eq!(signal.duration(), 0.1, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(signal.samples[0], 0.25, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(signal.samples[1], -0.25, epsilon = 1e-4);
    }

    #[test]
    fn stereo_is_averaged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // left = 16384, right = 0 on every frame
        let frames: Vec<i16> = (0..800).flat_map(|_| [16384, 0]).collect();
        write_wav(&path, 2, &frames);

        let signal = decode_file(&path).unwrap();
        assert_eq!(signal.samples.len(), 800);
        approx::assert_abs_diff_eq!(signal.samples[10], 0.25, epsilon = 1e-4);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(decode_file(dir.path().join("absent.wav")).is_err());
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not RIFF data").unwrap();
        assert!(decode_file(&path).is_err());
    }
}
