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

//! Reads the metadata and raw samples out of RIFF/WAVE files.
//!
//! The reader validates the RIFF header, then walks every chunk in the file.
//! The "fmt ", "data", "fact" and "cue " chunks are decoded; everything else
//! is skipped over. Only PCM and IEEE floating-point sample data is loaded,
//! though the format code of any other file is still reported.
//!
//! ```no_run
//! use riff_wave_reader::Reader;
//!
//! let mut reader = Reader::with_path("loop-cue.wav");
//! if reader.open().is_ok() {
//!     println!("Channels: {}", reader.num_channels());
//!     println!("Sample rate: {}", reader.sample_rate());
//! }
//! ```
//!
//! # The wave file format
//!
//! The wave file format starts with the RIFF file header:
//!
//! Offset | Size | Data       |    Description
//! -----: | ---: | ---------- | ----------------------------------------------
//!      0 |    4 | "RIFF"     | Identifies the main chunk.
//!      4 |    4 | chunk size | The size of the rest of the file. Read, but never checked against the real length.
//!      8 |    4 | "WAVE"     | Indicates that this is a wave file.
//!
//! A sequence of chunks follows, in any order. Each one starts with a four
//! byte tag and a little-endian 32-bit payload size. If the size is odd, a
//! single padding byte follows the payload so that the next chunk starts on
//! an even offset.
//!
//! The "fmt " chunk is the only one a file must have.
//!
//! ## The "fmt " chunk
//!
//! Offset | Size | Data            | Description
//! -----: | ---: | --------------- | -----------------------------------------
//!      0 |    2 | format          | 1 for PCM, 3 for IEEE float, 0xFFFE for extensible files.
//!      2 |    2 | num channels    | Indicates if the data is mono, stereo, or something else.
//!      4 |    4 | sample rate     | The sample rate per second.
//!      8 |    4 | byte rate       | The total byte rate per second.
//!     12 |    2 | block align     | How many bytes are needed for each "frame", where a frame is one sample for each channel.
//!     14 |    2 | bits per sample | The bits per sample; i.e. 16 for 16-bit audio.
//!     16 |  ... | extension       | Optional. For extensible files: extra info size, valid bits, channel mask and the sub format GUID.
//!
//! ## The "data" chunk
//!
//! The payload is the raw, interleaved sample data. It is only loaded when
//! the "fmt " chunk has already been seen and declares PCM or IEEE float.
//!
//! ## The "fact" chunk
//!
//! Offset | Size | Data            | Description
//! -----: | ---: | --------------- | -----------------------------------------
//!      0 |    4 | sample count    | Samples per channel. Mostly useful for compressed formats.
//!
//! ## The "cue " chunk
//!
//! A 32-bit count, then that many 24 byte cue points:
//!
//! Offset | Size | Data            | Description
//! -----: | ---: | --------------- | -----------------------------------------
//!      0 |    4 | identifier      | Unique identifier of the cue point.
//!      4 |    4 | position        | Sample position of the cue point.
//!      8 |    4 | chunk tag       | The chunk the cue point refers to. Must be "data".
//!     12 |    4 | chunk start     | Offset of that chunk, for wave lists.
//!     16 |    4 | block start     | Offset of the block holding the sample.
//!     20 |    4 | sample offset   | Sample offset within the block.
//!
//! See also:
//!
//! * [Multimedia Programming Interface and Data Specifications 1.0][1]
//! * [WAVEFORMATEXTENSIBLE structure][2]
//! * [Audio File Format Specifications][3]
//!
//! [1]: https://www.aelius.com/njh/wavemetatools/doc/riffmci.pdf
//! [2]: https://msdn.microsoft.com/en-us/library/windows/desktop/dd757714(v=vs.85).aspx
//! [3]: http://www-mmsp.ece.mcgill.ca/documents/audioformats/wave/wave.html

use std::io;
use std::result;

use thiserror::Error;

#[cfg(test)]
#[macro_use]
mod test_util;

mod chunks;
mod parse;
mod reader;
mod samples;

pub use chunks::{AudioFormat, ChunkInfo, ChunkKind, ChunkTag, CueChunk, CuePoint, DataChunk,
                 ExtensibleFormat, FactChunk, FormatChunk};
pub use chunks::{FORMAT_EXTENSIBLE, FORMAT_IEEE_FLOAT, FORMAT_PCM};
pub use parse::{chunk_kind, parse_wave};
pub use reader::{ReadOptions, Reader, WaveFile};
pub use samples::SampleReader;

// MARK: Error types

/// Represents an error that occurred while reading a wave file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file format is incorrect or unsupported.
    #[error("Format error: {0}")]
    Format(#[from] FormatErrorKind),
    /// An IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// `Reader::open` was called without a path.
    #[error("No file path was given")]
    NoPath,
}

/// Represents a result when reading a wave file.
pub type ReadResult<T> = result::Result<T, ReadError>;

/// Represents a file format error, when the wave file is incorrect or unsupported.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The file is shorter than the 12 byte RIFF header.
    #[error("file is too short to hold a RIFF header")]
    HeaderTooShort,
    /// The file does not start with a "RIFF" tag and chunk size.
    #[error("not a RIFF file")]
    NotARiffFile,
    /// The file doesn't continue with "WAVE" after the RIFF chunk header.
    #[error("not a WAVE file")]
    NotAWaveFile,
    /// The stream ended in the middle of a fixed-width field.
    #[error("{0} chunk is truncated")]
    TruncatedChunk(ChunkTag),
    /// A chunk declares more payload than the stream has left.
    #[error("{tag} chunk declares {declared} bytes, but only {available} remain")]
    ChunkOverrunsStream {
        tag: ChunkTag,
        declared: u32,
        available: u64,
    },
    /// The "fmt " chunk can't hold the mandatory fields.
    #[error("\"fmt \" chunk is too short ({0} bytes)")]
    FmtChunkTooShort(u32),
    /// A "fmt " chunk follows the "data" chunk it would have to describe.
    #[error("\"fmt \" chunk comes after the data chunk")]
    FmtAfterData,
    /// The "data" chunk can't be decoded before the format is known.
    #[error("data chunk comes before the fmt chunk")]
    DataBeforeFmt,
    /// Samples are only extracted for PCM and IEEE float files.
    #[error("unsupported audio format 0x{0:04X} (only PCM 0x0001 and IEEE float 0x0003 are supported)")]
    UnsupportedSampleFormat(u16),
    /// The "fact" chunk can't hold its sample count.
    #[error("fact chunk is too short ({0} bytes)")]
    FactChunkTooShort(u32),
    /// The "cue " chunk is too small for the cue points it declares.
    #[error("cue chunk of {chunk_size} bytes can't hold {declared_points} cue points")]
    CueChunkTooShort {
        declared_points: u32,
        chunk_size: u32,
    },
    /// We do not support cue points for chunks other than "data".
    #[error("cue point {identifier} refers to the {tag} chunk instead of data")]
    CuePointNotInData {
        identifier: u32,
        tag: ChunkTag,
    },
    /// The stream ended without a "fmt " chunk.
    #[error("no \"fmt \" chunk found")]
    MissingFmtChunk,
}

/// The broad categories a `ReadError` falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// No path, or the file could not be opened or read.
    Access,
    /// The RIFF/WAVE header is missing or wrong.
    Envelope,
    /// The chunks themselves are malformed.
    Structural,
    /// The file is well formed, but its samples can't be extracted.
    UnsupportedFormat,
}

impl FormatErrorKind {
    pub fn class(&self) -> ErrorClass {
        match *self {
            FormatErrorKind::HeaderTooShort |
            FormatErrorKind::NotARiffFile |
            FormatErrorKind::NotAWaveFile => ErrorClass::Envelope,
            FormatErrorKind::UnsupportedSampleFormat(_) => ErrorClass::UnsupportedFormat,
            _ => ErrorClass::Structural,
        }
    }
}

impl ReadError {
    pub fn class(&self) -> ErrorClass {
        match *self {
            ReadError::Format(ref kind) => kind.class(),
            ReadError::Io(ref err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                ErrorClass::Structural
            }
            ReadError::Io(_) | ReadError::NoPath => ErrorClass::Access,
        }
    }
}

// MARK: Tests
