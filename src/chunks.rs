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

//! The structures decoded out of a wave file's chunks.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};

use crate::samples::SampleReader;
use crate::ReadResult;

// MARK: Chunk tags

/// A four byte RIFF chunk identifier.
///
/// Tags are compared byte for byte, so the trailing space in `"fmt "` and
/// `"cue "` is significant.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    pub const RIFF: ChunkTag = ChunkTag(*b"RIFF");
    pub const WAVE: ChunkTag = ChunkTag(*b"WAVE");
    pub const FMT: ChunkTag = ChunkTag(*b"fmt ");
    pub const DATA: ChunkTag = ChunkTag(*b"data");
    pub const FACT: ChunkTag = ChunkTag(*b"fact");
    pub const CUE: ChunkTag = ChunkTag(*b"cue ");
    pub const JUNK: ChunkTag = ChunkTag(*b"JUNK");
    pub const LIST: ChunkTag = ChunkTag(*b"LIST");
    pub const INFO: ChunkTag = ChunkTag(*b"INFO");
    pub const SMPL: ChunkTag = ChunkTag(*b"smpl");
    pub const INST: ChunkTag = ChunkTag(*b"inst");
    pub const BEXT: ChunkTag = ChunkTag(*b"bext");
    pub const IXML: ChunkTag = ChunkTag(*b"iXML");

    /// Returns the raw bytes of this tag.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for ChunkTag {
    fn from(bytes: [u8; 4]) -> ChunkTag {
        ChunkTag(bytes)
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Vendor chunks can carry anything, so escape whatever isn't printable.
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02X}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ChunkTag(\"{}\")", self)
    }
}

/// How the chunk walker treats a chunk, decided by its tag alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkKind {
    /// The "fmt " chunk.
    Format,
    /// The "data" chunk.
    Data,
    /// The "fact" chunk.
    Fact,
    /// The "cue " chunk.
    Cue,
    /// A well-known chunk that this library skips without decoding.
    Ignored,
    /// A chunk we know nothing about. Also skipped.
    Unknown,
}

/// One entry in the inventory of chunks walked during a parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkInfo {
    pub tag: ChunkTag,
    pub kind: ChunkKind,
    /// Stream offset of the chunk's tag.
    pub offset: u64,
    /// The declared payload size, not counting the pad byte.
    pub size: u32,
}

// MARK: The "fmt " chunk

pub const FORMAT_PCM: u16 = 0x0001;
pub const FORMAT_IEEE_FLOAT: u16 = 0x0003;
pub const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// The format code of the "fmt " chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    /// Uncompressed PCM (1).
    Pcm,
    /// IEEE floating-point (3).
    IeeeFloat,
    /// Any other code. Recognized, but samples can't be extracted.
    Other(u16),
}

impl AudioFormat {
    pub fn from_code(code: u16) -> AudioFormat {
        match code {
            FORMAT_PCM => AudioFormat::Pcm,
            FORMAT_IEEE_FLOAT => AudioFormat::IeeeFloat,
            _ => AudioFormat::Other(code),
        }
    }

    pub fn code(&self) -> u16 {
        match *self {
            AudioFormat::Pcm => FORMAT_PCM,
            AudioFormat::IeeeFloat => FORMAT_IEEE_FLOAT,
            AudioFormat::Other(code) => code,
        }
    }

    /// Only PCM and IEEE float data chunks are loaded.
    pub fn supports_sample_extraction(&self) -> bool {
        match *self {
            AudioFormat::Pcm | AudioFormat::IeeeFloat => true,
            AudioFormat::Other(_) => false,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AudioFormat::Pcm => write!(f, "PCM"),
            AudioFormat::IeeeFloat => write!(f, "IEEE float"),
            AudioFormat::Other(FORMAT_EXTENSIBLE) => write!(f, "extensible (0xFFFE)"),
            AudioFormat::Other(code) => write!(f, "unknown (0x{:04X})", code),
        }
    }
}

/// The WAVE_FORMAT_EXTENSIBLE fields that can follow the standard header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensibleFormat {
    pub valid_bits_per_sample: u16,
    pub channel_mask: u32,
    /// The sub-format GUID, as stored in the file.
    pub sub_format: [u8; 16],
}

impl ExtensibleFormat {
    /// The first two bytes of the GUID hold the actual format code.
    pub fn sub_format_code(&self) -> u16 {
        LittleEndian::read_u16(&self.sub_format[0..2])
    }
}

/// The decoded "fmt " chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatChunk {
    pub audio_format: AudioFormat,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Present only for extensible files that carry the full extension.
    pub extensible: Option<ExtensibleFormat>,
}

impl FormatChunk {
    /// How many whole frames fit in `num_bytes` bytes of sample data.
    pub fn frame_count(&self, num_bytes: u32) -> u32 {
        if self.block_align == 0 {
            0
        } else {
            num_bytes / u32::from(self.block_align)
        }
    }
}

// MARK: The "data" chunk

/// The "data" chunk: where the samples live, and the samples themselves
/// unless the parse was told not to load them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataChunk {
    pub(crate) size: u32,
    pub(crate) offset: u64,
    pub(crate) audio_format: AudioFormat,
    pub(crate) bits_per_sample: u16,
    pub(crate) samples: Option<Vec<u8>>,
}

impl DataChunk {
    /// The declared size of the sample data, in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Stream offset of the first sample byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The format in effect when this chunk was decoded.
    pub fn audio_format(&self) -> AudioFormat {
        self.audio_format
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// The raw sample bytes in file order, or `None` if they were not loaded.
    pub fn samples(&self) -> Option<&[u8]> {
        self.samples.as_ref().map(|s| &s[..])
    }

    pub fn is_loaded(&self) -> bool {
        self.samples.is_some()
    }

    /// Returns a typed view over the loaded samples. The view is empty if the
    /// samples were not loaded.
    pub fn sample_reader(&self) -> SampleReader<'_> {
        SampleReader::new(self.samples().unwrap_or(&[]))
    }

    /// Reads the sample bytes from `reader`, which must be the stream this
    /// chunk was parsed from.
    pub fn read_samples_from<R>(&self, reader: &mut R) -> ReadResult<Vec<u8>>
        where R: Read + Seek
    {
        reader.seek(SeekFrom::Start(self.offset))?;
        let mut buf = vec![0; self.size as usize];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

// MARK: The "fact" chunk

/// The "fact" chunk, normally only present for non-PCM formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FactChunk {
    /// Number of samples per channel.
    pub sample_count: u32,
}

// MARK: The "cue " chunk

/// A single cue point. Only cue points into the "data" chunk are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CuePoint {
    pub identifier: u32,
    pub position: u32,
    pub chunk_tag: ChunkTag,
    pub chunk_start: u32,
    pub block_start: u32,
    pub sample_offset: u32,
}

/// The decoded "cue " chunk. `cue_points` always holds `num_cue_points`
/// entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CueChunk {
    pub num_cue_points: u32,
    pub cue_points: Vec<CuePoint>,
}
