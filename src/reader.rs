// riff-wave-reader -- Chunk-walking reader for RIFF/WAVE files.
// Copyright (c) 2016 Kevin Brothaler and the riff-wave project authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::chunks::{AudioFormat, ChunkInfo, CueChunk, CuePoint, DataChunk, FactChunk, FormatChunk};
use crate::parse::parse_wave;
use crate::{ReadError, ReadResult};

// MARK: Options

/// Controls what a parse keeps in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    /// Load the "data" chunk's samples. When false, only the offset and size
    /// of the samples are recorded.
    pub load_samples: bool,
}

impl Default for ReadOptions {
    fn default() -> ReadOptions {
        ReadOptions { load_samples: true }
    }
}

impl ReadOptions {
    pub fn new() -> ReadOptions {
        ReadOptions::default()
    }

    pub fn load_samples(mut self, load_samples: bool) -> ReadOptions {
        self.load_samples = load_samples;
        self
    }
}

// MARK: Parse result

/// Everything decoded out of one wave file.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveFile {
    pub(crate) riff_size: u32,
    pub(crate) format: FormatChunk,
    pub(crate) data: Option<DataChunk>,
    pub(crate) fact: Option<FactChunk>,
    pub(crate) cue: Option<CueChunk>,
    pub(crate) chunks: Vec<ChunkInfo>,
}

impl WaveFile {
    /// The size declared in the RIFF header. It isn't checked against the
    /// real length of the file.
    pub fn riff_size(&self) -> u32 {
        self.riff_size
    }

    pub fn format(&self) -> &FormatChunk {
        &self.format
    }

    pub fn data(&self) -> Option<&DataChunk> {
        self.data.as_ref()
    }

    pub fn fact(&self) -> Option<&FactChunk> {
        self.fact.as_ref()
    }

    /// The sample count from the "fact" chunk. `None` means the file didn't
    /// say, not that it has no samples.
    pub fn sample_count(&self) -> Option<u32> {
        self.fact.map(|fact| fact.sample_count)
    }

    pub fn cue(&self) -> Option<&CueChunk> {
        self.cue.as_ref()
    }

    /// The cue points, in file order. Empty if there was no "cue " chunk.
    pub fn cue_points(&self) -> &[CuePoint] {
        match self.cue {
            Some(ref cue) => &cue.cue_points,
            None => &[],
        }
    }

    /// Every chunk walked, in file order.
    pub fn chunks(&self) -> &[ChunkInfo] {
        &self.chunks
    }

    /// The number of whole frames in the "data" chunk.
    pub fn num_frames(&self) -> Option<u32> {
        self.data.as_ref().map(|data| self.format.frame_count(data.size()))
    }

    /// Playback length in seconds, if there is sample data and a sample rate.
    pub fn duration_secs(&self) -> Option<f64> {
        if self.format.sample_rate == 0 {
            return None;
        }
        self.num_frames().map(|frames| f64::from(frames) / f64::from(self.format.sample_rate))
    }
}

// MARK: Reader

/// Opens and parses wave files by path.
///
/// Every call to `open` replaces whatever an earlier call parsed. If `open`
/// fails the reader is left closed, and the getters return zero values.
#[derive(Debug, Default)]
pub struct Reader {
    path: Option<PathBuf>,
    options: ReadOptions,
    wave: Option<WaveFile>,
}

impl Reader {
    /// Returns a reader with no path. Use `open_path` to read a file.
    pub fn new() -> Reader {
        Reader::default()
    }

    /// Returns a reader for the file at `path`. Nothing is read until `open`.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Reader {
        Reader {
            path: Some(path.as_ref().to_path_buf()),
            ..Reader::default()
        }
    }

    pub fn with_options(mut self, options: ReadOptions) -> Reader {
        self.options = options;
        self
    }

    /// Sets the path and opens it.
    pub fn open_path<P: AsRef<Path>>(&mut self, path: P) -> ReadResult<()> {
        self.path = Some(path.as_ref().to_path_buf());
        self.open()
    }

    /// Opens and parses the file at the current path.
    pub fn open(&mut self) -> ReadResult<()> {
        self.wave = None;

        let path = match self.path {
            Some(ref path) if !path.as_os_str().is_empty() => path,
            _ => return Err(ReadError::NoPath),
        };
        info!("Opening file: {}", absolute_path(path).display());

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let wave = parse_wave(&mut reader, &self.options)?;
        debug!("Parsed {} chunks from {}", wave.chunks().len(), path.display());

        self.wave = Some(wave);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.wave.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref().map(|p| p.as_path())
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// The whole parse result, if the reader is open.
    pub fn wave(&self) -> Option<&WaveFile> {
        self.wave.as_ref()
    }

    pub fn num_channels(&self) -> u16 {
        self.format_chunk().map_or(0, |f| f.num_channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.format_chunk().map_or(0, |f| f.sample_rate)
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.format_chunk().map_or(0, |f| f.bits_per_sample)
    }

    pub fn audio_format(&self) -> AudioFormat {
        self.format_chunk().map_or(AudioFormat::Other(0), |f| f.audio_format)
    }

    pub fn format_chunk(&self) -> Option<&FormatChunk> {
        self.wave.as_ref().map(|w| w.format())
    }

    pub fn data_chunk(&self) -> Option<&DataChunk> {
        self.wave.as_ref().and_then(|w| w.data())
    }

    pub fn fact_chunk(&self) -> Option<&FactChunk> {
        self.wave.as_ref().and_then(|w| w.fact())
    }

    pub fn cue_chunk(&self) -> Option<&CueChunk> {
        self.wave.as_ref().and_then(|w| w.cue())
    }

    /// The loaded sample bytes, exactly as stored in the file. Empty if there
    /// are none, or if they weren't loaded.
    pub fn raw_sample_data(&self) -> &[u8] {
        self.data_chunk().and_then(|d| d.samples()).unwrap_or(&[])
    }

    /// Returns the sample bytes, reading them from the file if the reader was
    /// opened without loading them.
    pub fn load_samples(&self) -> ReadResult<Vec<u8>> {
        let data = match self.data_chunk() {
            Some(data) => data,
            None => return Ok(Vec::new()),
        };
        if let Some(samples) = data.samples() {
            return Ok(samples.to_vec());
        }

        let path = self.path.as_ref().ok_or(ReadError::NoPath)?;
        let mut reader = BufReader::new(File::open(path)?);
        data.read_samples_from(&mut reader)
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    // If the working directory is gone, log the path as given.
    match env::current_dir() {
        Ok(dir) => dir.join(path),
        Err(_) => path.to_path_buf(),
    }
}

// MARK: Tests

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    use super::{ReadOptions, Reader};
    use crate::chunks::AudioFormat;
    use crate::test_util::{cue_payload, fmt_payload, WaveBytes};
    use crate::{FormatErrorKind, ReadError};

    fn write_temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("riff_wave_reader_{}_{}", std::process::id(), name));
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_open_without_path() {
        let mut reader = Reader::new();
        assert_matches!(Err(ReadError::NoPath), reader.open());
        assert!(!reader.is_open());

        let mut reader = Reader::with_path("");
        assert_matches!(Err(ReadError::NoPath), reader.open());
    }

    #[test]
    fn test_open_missing_file() {
        let mut reader = Reader::with_path("this_file_does_not_exist.wav");
        assert_matches!(Err(ReadError::Io(_)), reader.open());
        assert!(!reader.is_open());
        assert_eq!(0, reader.num_channels());
        assert_eq!(0, reader.sample_rate());
        assert_eq!(0, reader.bits_per_sample());
        assert_eq!(AudioFormat::Other(0), reader.audio_format());
        assert!(reader.raw_sample_data().is_empty());
    }

    #[test]
    fn test_open_and_reopen() {
        let stereo = write_temp_file("reopen_stereo.wav",
                                     &WaveBytes::new()
                                         .chunk(b"fmt ", &fmt_payload(1, 2, 44100, 16))
                                         .chunk(b"data", b"\x01\x00\x02\x00")
                                         .chunk(b"cue ", &cue_payload(&[(1, b"data", 0)]))
                                         .build());
        let mono = write_temp_file("reopen_mono.wav",
                                   &WaveBytes::new()
                                       .chunk(b"fmt ", &fmt_payload(3, 1, 96000, 32))
                                       .build());
        let broken = write_temp_file("reopen_broken.wav", b"INVALID DATA");

        let mut reader = Reader::with_path(&stereo);
        reader.open().unwrap();
        assert_eq!(2, reader.num_channels());
        assert_eq!(44100, reader.sample_rate());
        assert_eq!(16, reader.bits_per_sample());
        assert_eq!(b"\x01\x00\x02\x00", reader.raw_sample_data());
        assert_eq!(1, reader.cue_chunk().unwrap().num_cue_points);

        // Nothing carries over from the first file.
        reader.open_path(&mono).unwrap();
        assert_eq!(1, reader.num_channels());
        assert_eq!(AudioFormat::IeeeFloat, reader.audio_format());
        assert!(reader.data_chunk().is_none());
        assert!(reader.cue_chunk().is_none());

        assert_matches!(Err(ReadError::Format(FormatErrorKind::NotARiffFile)),
                        reader.open_path(&broken));
        assert!(!reader.is_open());
        assert!(reader.wave().is_none());
        assert_eq!(0, reader.num_channels());

        for path in &[stereo, mono, broken] {
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn test_load_deferred_samples() {
        let path = write_temp_file("deferred.wav",
                                   &WaveBytes::new()
                                       .chunk(b"fmt ", &fmt_payload(1, 1, 8000, 8))
                                       .chunk(b"data", b"\x80\x81\x82")
                                       .build());

        let mut reader = Reader::with_path(&path)
            .with_options(ReadOptions::new().load_samples(false));
        reader.open().unwrap();
        assert!(reader.raw_sample_data().is_empty());
        assert_eq!(3, reader.data_chunk().unwrap().size());
        assert_eq!(b"\x80\x81\x82".to_vec(), reader.load_samples().unwrap());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_frames_and_duration() {
        let path = write_temp_file("duration.wav",
                                   &WaveBytes::new()
                                       .chunk(b"fmt ", &fmt_payload(1, 2, 4, 16))
                                       .chunk(b"data", &[0u8; 32])
                                       .build());
        let mut reader = Reader::with_path(&path);
        reader.open().unwrap();

        let wave = reader.wave().unwrap();
        assert_eq!(Some(8), wave.num_frames());
        assert_eq!(Some(2.0), wave.duration_secs());
        assert_eq!(wave.riff_size() as usize + 8, fs::metadata(&path).unwrap().len() as usize);

        let _ = fs::remove_file(&path);
    }
}
