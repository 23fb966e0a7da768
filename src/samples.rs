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

use std::io;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

/// Reads typed samples out of the raw bytes of a "data" chunk.
///
/// The reader doesn't check the samples against the "fmt " chunk; pick the
/// method that matches `bits_per_sample` and the audio format. Samples are
/// interleaved, so a stereo file yields left, right, left, right...
#[derive(Debug, Clone)]
pub struct SampleReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> SampleReader<'a> {
    pub fn new(bytes: &'a [u8]) -> SampleReader<'a> {
        SampleReader { cursor: Cursor::new(bytes) }
    }

    /// Reads a single sample as an unsigned 8-bit value. If we've reached the
    /// end of the data, then this will return Ok(None).
    pub fn read_sample_u8(&mut self) -> io::Result<Option<u8>> {
        self.read_sample(1, |reader| reader.read_u8())
    }

    /// Reads a single sample as a signed 16-bit value. If we've reached the
    /// end of the data, then this will return Ok(None).
    pub fn read_sample_i16(&mut self) -> io::Result<Option<i16>> {
        self.read_sample(2, |reader| reader.read_i16::<LittleEndian>())
    }

    /// Reads a single 24-bit sample, sign extended to 32 bits.
    pub fn read_sample_i24(&mut self) -> io::Result<Option<i32>> {
        self.read_sample(3, |reader| reader.read_i24::<LittleEndian>())
    }

    pub fn read_sample_i32(&mut self) -> io::Result<Option<i32>> {
        self.read_sample(4, |reader| reader.read_i32::<LittleEndian>())
    }

    /// Reads a single IEEE float sample.
    pub fn read_sample_f32(&mut self) -> io::Result<Option<f32>> {
        self.read_sample(4, |reader| reader.read_f32::<LittleEndian>())
    }

    fn read_sample<F, S>(&mut self, width: u64, read_data: F) -> io::Result<Option<S>>
        where F: Fn(&mut Cursor<&'a [u8]>) -> io::Result<S>
    {
        // A trailing partial sample is never returned.
        if self.remaining() < width {
            Ok(None)
        } else {
            read_data(&mut self.cursor).map(Some)
        }
    }

    /// The number of bytes not read yet.
    pub fn remaining(&self) -> u64 {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position())
    }

    /// Reads several samples as unsigned 8-bit values. Returns the number of
    /// samples read.
    pub fn read_samples_as_u8(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_samples(buf, Self::read_sample_u8)
    }

    /// Reads several samples as signed 16-bit values. Returns the number of
    /// samples read.
    pub fn read_samples_as_i16(&mut self, buf: &mut [i16]) -> io::Result<usize> {
        self.read_samples(buf, Self::read_sample_i16)
    }

    pub fn read_samples_as_i24(&mut self, buf: &mut [i32]) -> io::Result<usize> {
        self.read_samples(buf, Self::read_sample_i24)
    }

    pub fn read_samples_as_i32(&mut self, buf: &mut [i32]) -> io::Result<usize> {
        self.read_samples(buf, Self::read_sample_i32)
    }

    pub fn read_samples_as_f32(&mut self, buf: &mut [f32]) -> io::Result<usize> {
        self.read_samples(buf, Self::read_sample_f32)
    }

    fn read_samples<F, S>(&mut self, buf: &mut [S], read_sample_impl: F) -> io::Result<usize>
        where F: Fn(&mut Self) -> io::Result<Option<S>>
    {
        let mut successfully_read = 0;

        for out in &mut buf[..] {
            match read_sample_impl(self)? {
                Some(sample) => {
                    *out = sample;
                    successfully_read += 1;
                }
                None => break,
            }
        }

        Ok(successfully_read)
    }
}

// MARK: Tests
