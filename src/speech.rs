//! Speech collaborators: synthesis and recognition.
//!
//! Concrete engines live outside this crate. They plug in through
//! [`Synthesizer`] and [`Transcriber`] and are chosen when the session is
//! built. CLI-based engines that emit WAV can use [`AudioClip::from_wav`].

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::io::Cursor;
use std::time::Duration;

/// Decoded PCM audio, interleaved, normalised to `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Interleaved samples.
    pub samples: Vec<f32>,
    /// Channel count (at least 1).
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Wrap raw samples.
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            sample_rate,
        }
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Playback length.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Decode a RIFF/WAVE file holding 16-bit PCM.
    ///
    /// A `data` chunk whose declared size runs past the end of the buffer
    /// (engines streaming to a pipe write `0xFFFFFFFF`) is read to the end.
    pub fn from_wav(bytes: &[u8]) -> Result<Self> {
        let bytes = fix_streamed_sizes(bytes);
        let reader = hound::WavReader::new(Cursor::new(bytes.as_ref()))?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(Error::InvalidWav("only 16-bit PCM is supported"));
        }

        let samples = reader
            .into_samples::<i16>()
            .map_while(std::result::Result::ok)
            .map(|sample| f32::from(sample) / 32768.0)
            .collect();
        Ok(Self::new(samples, spec.channels, spec.sample_rate))
    }
}

/// Clamp the RIFF and `data` sizes to what the buffer actually holds.
fn fix_streamed_sizes(bytes: &[u8]) -> Cow<'_, [u8]> {
    let Some(tag) = bytes.windows(4).position(|w| w == b"data") else {
        return Cow::Borrowed(bytes);
    };
    let body = tag + 8;
    let Some(declared) = bytes.get(tag + 4..body).and_then(|raw| <[u8; 4]>::try_from(raw).ok()) else {
        return Cow::Borrowed(bytes);
    };
    let available = bytes.len() - body;
    if u32::from_le_bytes(declared) as usize <= available {
        return Cow::Borrowed(bytes);
    }

    let mut fixed = bytes.to_vec();
    let data_len = u32::try_from(available & !1).unwrap_or(u32::MAX & !1);
    let riff_len = u32::try_from(fixed.len() - 8).unwrap_or(u32::MAX);
    fixed[tag + 4..body].copy_from_slice(&data_len.to_le_bytes());
    fixed[4..8].copy_from_slice(&riff_len.to_le_bytes());
    tracing::debug!(declared = u32::from_le_bytes(declared), actual = data_len, "patched streamed WAV header");
    Cow::Owned(fixed)
}

/// Text-to-speech engine.
pub trait Synthesizer: Send + Sync {
    /// Render `text` as audio.
    ///
    /// `Ok(None)` means the engine produced nothing to play (some engines
    /// speak directly to the device). Errors are logged by the caller and
    /// treated the same way.
    fn synthesize(
        &self,
        text: &str,
        speaker_id: Option<&str>,
        speech_rate: Option<f32>,
    ) -> Result<Option<AudioClip>>;
}

/// Speech-to-text engine.
pub trait Transcriber: Send + Sync {
    /// Recognise speech in mono `samples`. An empty string means nothing was recognised.
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav(channels: u16, sample_rate: u32, bits: u16, data: &[u8], extra_chunk: bool) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        if extra_chunk {
            out.extend_from_slice(b"LIST");
            out.extend_from_slice(&4u32.to_le_bytes());
            out.extend_from_slice(&[1, 2, 3, 4]);
        }
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        let block_align = channels * (bits / 8);
        out.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&u32::try_from(data.len()).unwrap().to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_from_wav_pcm16() {
        let data: Vec<u8> = [0i16, 16384, -32768, 32767]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let clip = AudioClip::from_wav(&wav(2, 22_050, 16, &data, true)).unwrap();

        assert_eq!(clip.channels, 2);
        assert_eq!(clip.sample_rate, 22_050);
        assert_eq!(clip.frames(), 2);
        assert_eq!(clip.samples[0], 0.0);
        assert_eq!(clip.samples[1], 0.5);
        assert_eq!(clip.samples[2], -1.0);
    }

    #[test]
    fn test_from_wav_streamed_size_reads_to_end() {
        let mut bytes = wav(1, 16_000, 16, &[0, 0, 0, 0], false);
        let len = bytes.len();
        bytes[len - 8..len - 4].copy_from_slice(&u32::MAX.to_le_bytes());
        let clip = AudioClip::from_wav(&bytes).unwrap();
        assert_eq!(clip.samples.len(), 2);

        // An odd trailing byte is dropped rather than read as half a sample.
        bytes.push(7);
        assert_eq!(AudioClip::from_wav(&bytes).unwrap().samples.len(), 2);
    }

    #[test]
    fn test_from_wav_rejects_bad_input() {
        assert!(matches!(AudioClip::from_wav(b"nope"), Err(Error::Wav(_))));
        assert!(matches!(
            AudioClip::from_wav(&wav(1, 8_000, 8, &[1, 2], false)),
            Err(Error::InvalidWav("only 16-bit PCM is supported"))
        ));

        let header_only = &wav(1, 8_000, 16, &[], false)[..36];
        assert!(matches!(AudioClip::from_wav(header_only), Err(Error::Wav(_))));
    }

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip::new(vec![0.0; 48_000], 2, 24_000);
        assert_eq!(clip.duration(), Duration::from_secs(1));
        assert_eq!(AudioClip::new(Vec::new(), 0, 0).duration(), Duration::ZERO);
    }
}
