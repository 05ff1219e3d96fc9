//! # Sample Format Converter
//!
//! Converts between the codec's decoded buffers, the 16-bit little-endian
//! byte stream handed to the read loop, and normalized `f32` samples.

use bytes::{BufMut, BytesMut};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use tracing::warn;

/// Divisor mapping the full `i16` range onto `[-1.0, 1.0)`.
pub const I16_NORMALIZATION: f32 = 32768.0;

/// Sample converter for the forced signed 16-bit output encoding.
///
/// Symphonia outputs audio in various formats and planar layouts. Every
/// decoded buffer is converted to interleaved `i16` and serialized as
/// little-endian bytes; the read loop then normalizes those bytes to `f32`.
pub struct SampleConverter;

impl SampleConverter {
    /// Normalize a single sample by dividing by 32768.
    ///
    /// `i16::MIN` maps to exactly `-1.0`; `i16::MAX` to just under `1.0`.
    pub fn normalize(sample: i16) -> f32 {
        sample as f32 / I16_NORMALIZATION
    }

    /// Reinterpret `bytes` as little-endian `i16` samples and append their
    /// normalized values to `out`.
    ///
    /// Returns the number of samples appended. A trailing odd byte is ignored;
    /// callers that stream chunks are responsible for carrying it over.
    pub fn extend_normalized(bytes: &[u8], out: &mut Vec<f32>) -> usize {
        let chunks = bytes.chunks_exact(2);
        let count = chunks.len();
        out.reserve(count);
        out.extend(chunks.map(|pair| Self::normalize(i16::from_le_bytes([pair[0], pair[1]]))));
        count
    }

    /// Convert a decoded buffer to interleaved `i16` and append it as
    /// little-endian bytes.
    ///
    /// `scratch` is reused across packets and grown when a packet exceeds its
    /// capacity.
    pub fn append_s16le(
        decoded: AudioBufferRef<'_>,
        scratch: &mut Option<SampleBuffer<i16>>,
        out: &mut BytesMut,
    ) -> usize {
        let spec = *decoded.spec();
        let needed = decoded.capacity() as u64;

        let reuse = matches!(
            scratch,
            Some(buf) if buf.capacity() as u64 >= needed * spec.channels.count() as u64
        );
        if !reuse {
            *scratch = Some(SampleBuffer::<i16>::new(needed, spec));
        }

        let Some(buf) = scratch.as_mut() else {
            return 0;
        };

        buf.copy_interleaved_ref(decoded);

        let samples = buf.samples();
        out.reserve(samples.len() * 2);
        for &sample in samples {
            out.put_i16_le(sample);
        }

        samples.len()
    }

    /// Count samples outside `[-1.0, 1.0]`, warning when any are found.
    pub fn validate_samples(samples: &[f32]) -> usize {
        let clipped = samples
            .iter()
            .filter(|&&s| !(-1.0..=1.0).contains(&s))
            .count();

        if clipped > 0 {
            warn!(
                "Detected {} out-of-range samples ({:.2}% of total)",
                clipped,
                (clipped as f64 / samples.len() as f64) * 100.0
            );
        }

        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::audio::{AsAudioBufferRef, AudioBuffer, Channels, Signal, SignalSpec};

    #[test]
    fn test_normalize_extremes() {
        assert_eq!(SampleConverter::normalize(0), 0.0);
        assert_eq!(SampleConverter::normalize(i16::MIN), -1.0);
        assert_eq!(SampleConverter::normalize(16384), 0.5);
        assert!(SampleConverter::normalize(i16::MAX) < 1.0);
    }

    #[test]
    fn test_extend_normalized_little_endian() {
        let bytes = [0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F];
        let mut out = Vec::new();

        let count = SampleConverter::extend_normalized(&bytes, &mut out);

        assert_eq!(count, 3);
        assert_eq!(out[0], 0.5);
        assert_eq!(out[1], -0.5);
        assert!(out[2] > 0.99 && out[2] < 1.0);
    }

    #[test]
    fn test_extend_normalized_ignores_odd_tail() {
        let mut out = Vec::new();
        let count = SampleConverter::extend_normalized(&[0x00, 0x40, 0x12], &mut out);
        assert_eq!(count, 1);
        assert_eq!(out, vec![0.5]);
    }

    #[test]
    fn test_append_s16le_interleaves_planes() {
        let spec = SignalSpec::new(44100, Channels::FRONT_LEFT | Channels::FRONT_RIGHT);
        let mut planar = AudioBuffer::<i16>::new(4, spec);
        planar.render_reserved(Some(2));
        planar.chan_mut(0).copy_from_slice(&[1, 2]);
        planar.chan_mut(1).copy_from_slice(&[-1, -2]);

        let mut scratch = None;
        let mut out = BytesMut::new();
        let written = SampleConverter::append_s16le(planar.as_audio_buffer_ref(), &mut scratch, &mut out);

        assert_eq!(written, 4);
        let expected: Vec<u8> = [1i16, -1, 2, -2]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        assert_eq!(&out[..], expected.as_slice());
    }

    #[test]
    fn test_validate_samples_counts_clipping() {
        assert_eq!(SampleConverter::validate_samples(&[0.0, 1.0, -1.0]), 0);
        assert_eq!(SampleConverter::validate_samples(&[1.5, -1.5, 0.5]), 2);
    }
}
