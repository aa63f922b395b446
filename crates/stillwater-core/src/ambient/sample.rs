//! Loading recorded samples and writing rendered audio.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::AudioBuffer;
use crate::error::AudioError;

/// Source of recorded sounds, looked up by name (`rain`, `bowls`, `bell`).
pub trait SampleLoader {
    /// `Ok(None)` when no sample exists for `name`.
    fn load(&mut self, name: &str) -> Result<Option<AudioBuffer>, AudioError>;
}

impl<T: SampleLoader + ?Sized> SampleLoader for &mut T {
    fn load(&mut self, name: &str) -> Result<Option<AudioBuffer>, AudioError> {
        (**self).load(name)
    }
}

/// Never has a sample; every channel is synthesized.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSamples;

impl SampleLoader for NoSamples {
    fn load(&mut self, _name: &str) -> Result<Option<AudioBuffer>, AudioError> {
        Ok(None)
    }
}

/// Reads `<dir>/<name>.wav`, caching decoded buffers.
#[derive(Debug)]
pub struct DirSampleLoader {
    dir: PathBuf,
    cache: HashMap<String, AudioBuffer>,
}

impl DirSampleLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SampleLoader for DirSampleLoader {
    fn load(&mut self, name: &str) -> Result<Option<AudioBuffer>, AudioError> {
        if let Some(buf) = self.cache.get(name) {
            return Ok(Some(buf.clone()));
        }
        let path = self.dir.join(format!("{name}.wav"));
        if !path.is_file() {
            return Ok(None);
        }
        let buf = read_wav(&path)?;
        tracing::debug!(name, path = %path.display(), secs = buf.duration_secs(), "loaded sample");
        self.cache.insert(name.to_string(), buf.clone());
        Ok(Some(buf))
    }
}

/// Decode a WAV file, averaging channels down to mono.
pub fn read_wav(path: &Path) -> Result<AudioBuffer, AudioError> {
    let decode_failed = |message: String| AudioError::DecodeFailed {
        path: path.to_path_buf(),
        message,
    };
    let mut reader = hound::WavReader::open(path).map_err(|e| decode_failed(e.to_string()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| decode_failed(e.to_string()))?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{}-bit integer PCM",
                    spec.bits_per_sample
                )));
            }
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| decode_failed(e.to_string()))?
        }
    };

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();
    Ok(AudioBuffer::new(spec.sample_rate, samples))
}

/// Write mono float samples as a 32-bit float WAV file.
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for s in &buffer.samples {
        writer.write_sample(*s)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_int_stereo(path: &Path) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..100 {
            w.write_sample(i16::MAX / 2).unwrap();
            w.write_sample(0i16).unwrap();
        }
        w.finalize().unwrap();
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DirSampleLoader::new(dir.path());
        assert!(loader.load("rain").unwrap().is_none());
    }

    #[test]
    fn stereo_int_is_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        write_int_stereo(&dir.path().join("rain.wav"));
        let mut loader = DirSampleLoader::new(dir.path());
        let buf = loader.load("rain").unwrap().unwrap();
        assert_eq!(buf.sample_rate, 8000);
        assert_eq!(buf.len(), 100);
        assert!((buf.samples[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn loaded_samples_are_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bowls.wav");
        write_int_stereo(&path);
        let mut loader = DirSampleLoader::new(dir.path());
        loader.load("bowls").unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(loader.load("bowls").unwrap().is_some());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stream.wav"), b"not a wav").unwrap();
        let mut loader = DirSampleLoader::new(dir.path());
        assert!(matches!(
            loader.load("stream"),
            Err(AudioError::DecodeFailed { .. })
        ));
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let buf = AudioBuffer::new(8000, vec![0.0, 0.5, -0.5, 0.25]);
        write_wav(&path, &buf).unwrap();
        assert_eq!(read_wav(&path).unwrap(), buf);
    }
}
