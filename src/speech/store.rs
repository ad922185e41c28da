//! Generated audio files

use std::io::Cursor;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::{Error, Result};

/// Directory of synthesized WAV files and the route that serves it
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
    route: String,
    prefix: String,
    sample_rate: u32,
}

impl AudioStore {
    /// `route` is the URL path segment the directory is served under
    #[must_use]
    pub fn new(
        dir: impl Into<PathBuf>,
        route: impl Into<String>,
        prefix: impl Into<String>,
        sample_rate: u32,
    ) -> Self {
        Self {
            dir: dir.into(),
            route: route.into().trim_matches('/').to_string(),
            prefix: prefix.into(),
            sample_rate,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Create the directory if it is missing
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Write samples to a new uniquely named WAV file, returning its name
    ///
    /// # Errors
    ///
    /// Returns error if encoding or writing fails
    pub async fn save(&self, samples: &[f32]) -> Result<String> {
        let wav = samples_to_wav(samples, self.sample_rate)?;
        let filename = format!("{}{}.wav", self.prefix, uuid::Uuid::new_v4().simple());

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), wav).await?;

        Ok(filename)
    }

    /// Public URL of a stored file
    #[must_use]
    pub fn url_for(&self, base_url: &str, filename: &str) -> String {
        format!("{}/{}/{filename}", base_url.trim_end_matches('/'), self.route)
    }
}

/// Encode mono samples in `[-1.0, 1.0]` as a 16-bit PCM WAV file
///
/// Out-of-range samples are clipped symmetrically to `±i16::MAX`.
///
/// # Errors
///
/// Returns `Error::Audio` if the clip is too long for a WAV header or
/// encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let audio = |e: hound::Error| Error::Audio(e.to_string());
    let frames = u32::try_from(samples.len())
        .map_err(|_| Error::Audio(format!("{} samples exceed a WAV file", samples.len())))?;

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut out = Cursor::new(Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2));

    let mut wav = WavWriter::new(&mut out, spec).map_err(audio)?;
    let mut pcm = wav.get_i16_writer(frames);
    for &sample in samples {
        pcm.write_sample(to_pcm16(sample));
    }
    pcm.flush().map_err(audio)?;
    wav.finalize().map_err(audio)?;

    Ok(out.into_inner())
}

/// Size of the canonical RIFF/WAVE header hound writes for PCM
const WAV_HEADER_LEN: usize = 44;

#[allow(clippy::cast_possible_truncation)]
fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}
