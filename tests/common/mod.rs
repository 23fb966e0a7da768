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

#![allow(dead_code)]

use std::env;
use std::fs;
use std::path::PathBuf;

/// Assembles a RIFF/WAVE file in memory, padding odd chunks.
pub struct WaveBytes {
    body: Vec<u8>,
}

impl WaveBytes {
    pub fn new() -> WaveBytes {
        WaveBytes { body: Vec::new() }
    }

    pub fn fmt(self, format: u16, num_channels: u16, sample_rate: u32, bits_per_sample: u16) -> WaveBytes {
        self.chunk(b"fmt ", &fmt_payload(format, num_channels, sample_rate, bits_per_sample))
    }

    /// A "cue " chunk with one cue point per `(identifier, tag, sample_offset)`.
    pub fn cue(self, points: &[(u32, &[u8; 4], u32)]) -> WaveBytes {
        self.chunk(b"cue ", &cue_payload(points))
    }

    pub fn chunk(mut self, tag: &[u8; 4], payload: &[u8]) -> WaveBytes {
        self.body.extend_from_slice(tag);
        self.body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.body.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            self.body.push(0);
        }
        self
    }

    /// Appends bytes as they are, for truncated or malformed chunks.
    pub fn raw(mut self, bytes: &[u8]) -> WaveBytes {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut vec = Vec::new();
        vec.extend_from_slice(b"RIFF");
        vec.extend_from_slice(&(self.body.len() as u32 + 4).to_le_bytes());
        vec.extend_from_slice(b"WAVE");
        vec.extend_from_slice(&self.body);
        vec
    }

    /// Writes the file to the temp directory and returns its path.
    pub fn write_temp(self, name: &str) -> TempWave {
        let mut path = env::temp_dir();
        path.push(format!("riff_wave_reader_it_{}_{}", std::process::id(), name));
        fs::write(&path, self.build()).unwrap();
        TempWave { path }
    }
}

/// A generated file that is removed again when dropped.
pub struct TempWave {
    pub path: PathBuf,
}

impl Drop for TempWave {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// A 16 byte "fmt " payload.
pub fn fmt_payload(format: u16, num_channels: u16, sample_rate: u32, bits_per_sample: u16) -> Vec<u8> {
    let block_align = num_channels * ((bits_per_sample + 7) / 8);
    let byte_rate = sample_rate * u32::from(block_align);

    let mut vec = Vec::new();
    vec.extend_from_slice(&format.to_le_bytes());
    vec.extend_from_slice(&num_channels.to_le_bytes());
    vec.extend_from_slice(&sample_rate.to_le_bytes());
    vec.extend_from_slice(&byte_rate.to_le_bytes());
    vec.extend_from_slice(&block_align.to_le_bytes());
    vec.extend_from_slice(&bits_per_sample.to_le_bytes());
    vec
}

/// A "cue " payload. Each point sits in the first block of "data", so its
/// position and sample offset are the same.
pub fn cue_payload(points: &[(u32, &[u8; 4], u32)]) -> Vec<u8> {
    let mut vec = Vec::new();
    vec.extend_from_slice(&(points.len() as u32).to_le_bytes());
    for &(identifier, tag, sample_offset) in points {
        vec.extend_from_slice(&identifier.to_le_bytes());
        vec.extend_from_slice(&sample_offset.to_le_bytes());
        vec.extend_from_slice(tag);
        vec.extend_from_slice(&0u32.to_le_bytes());
        vec.extend_from_slice(&0u32.to_le_bytes());
        vec.extend_from_slice(&sample_offset.to_le_bytes());
    }
    vec
}
