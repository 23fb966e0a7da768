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
use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::{debug, warn};

use crate::chunks::{AudioFormat, ChunkInfo, ChunkKind, ChunkTag, CueChunk, CuePoint, DataChunk,
                    ExtensibleFormat, FactChunk, FormatChunk, FORMAT_EXTENSIBLE};
use crate::reader::{ReadOptions, WaveFile};
use crate::{FormatErrorKind, ReadError, ReadResult};

// MARK: Decode table

const RIFF_HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: u64 = 8;
const FMT_MANDATORY_SIZE: u32 = 16;
// 16 mandatory bytes, the extra info size, then 22 bytes of extension.
const FMT_EXTENSIBLE_SIZE: u32 = 40;
const EXTENSIBLE_INFO_SIZE: u16 = 22;
const FACT_SIZE: u32 = 4;
const CUE_POINT_SIZE: u64 = 24;

const DECODE_TABLE: [(ChunkTag, ChunkKind); 11] = [
    (ChunkTag::FMT, ChunkKind::Format),
    (ChunkTag::DATA, ChunkKind::Data),
    (ChunkTag::FACT, ChunkKind::Fact),
    (ChunkTag::CUE, ChunkKind::Cue),
    (ChunkTag::JUNK, ChunkKind::Ignored),
    (ChunkTag::LIST, ChunkKind::Ignored),
    (ChunkTag::INFO, ChunkKind::Ignored),
    (ChunkTag::SMPL, ChunkKind::Ignored),
    (ChunkTag::INST, ChunkKind::Ignored),
    (ChunkTag::BEXT, ChunkKind::Ignored),
    (ChunkTag::IXML, ChunkKind::Ignored),
];

/// Looks up how the chunk walker treats chunks with the given tag.
pub fn chunk_kind(tag: ChunkTag) -> ChunkKind {
    DECODE_TABLE.iter()
        .find(|&&(known, _)| known == tag)
        .map(|&(_, kind)| kind)
        .unwrap_or(ChunkKind::Unknown)
}

// MARK: Validation and parsing functions

fn truncated(tag: ChunkTag, err: io::Error) -> ReadError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        warn!("Stream ended inside the {} chunk", tag);
        ReadError::Format(FormatErrorKind::TruncatedChunk(tag))
    } else {
        ReadError::Io(err)
    }
}

fn validate_fmt_chunk_is_large_enough(size: u32) -> ReadResult<()> {
    if size < FMT_MANDATORY_SIZE {
        Err(ReadError::Format(FormatErrorKind::FmtChunkTooShort(size)))
    } else {
        Ok(())
    }
}

fn validate_cue_chunk_is_large_enough(num_cue_points: u32, size: u32) -> ReadResult<()> {
    let needed = 4 + u64::from(num_cue_points) * CUE_POINT_SIZE;
    if needed > u64::from(size) {
        Err(ReadError::Format(FormatErrorKind::CueChunkTooShort {
            declared_points: num_cue_points,
            chunk_size: size,
        }))
    } else {
        Ok(())
    }
}

fn validate_chunk_fits(tag: ChunkTag, size: u32, available: u64) -> ReadResult<()> {
    if u64::from(size) > available {
        warn!("{} chunk declares {} bytes, but only {} remain", tag, size, available);
        Err(ReadError::Format(FormatErrorKind::ChunkOverrunsStream {
            tag,
            declared: size,
            available,
        }))
    } else {
        Ok(())
    }
}

pub(crate) trait ReadWaveExt: Read + Seek {
    /// Reads the 12 byte RIFF header, returning the declared RIFF size.
    fn validate_riff_header(&mut self) -> ReadResult<u32> {
        let mut header = [0u8; RIFF_HEADER_SIZE];
        if self.read_up_to(&mut header)? < RIFF_HEADER_SIZE {
            return Err(ReadError::Format(FormatErrorKind::HeaderTooShort));
        }
        if &header[0..4] != ChunkTag::RIFF.as_bytes() {
            return Err(ReadError::Format(FormatErrorKind::NotARiffFile));
        }
        // The RIFF size is not validated, so that we can still read files
        // that have an incorrect one.
        if &header[8..12] != ChunkTag::WAVE.as_bytes() {
            return Err(ReadError::Format(FormatErrorKind::NotAWaveFile));
        }
        Ok(LittleEndian::read_u32(&header[4..8]))
    }

    /// Fills as much of `buf` as the stream allows.
    fn read_up_to(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }

    /// Reads the next chunk tag. Returns `None` once fewer than four bytes
    /// are left.
    fn read_tag(&mut self) -> io::Result<Option<ChunkTag>> {
        let mut tag = [0u8; 4];
        if self.read_up_to(&mut tag)? < tag.len() {
            Ok(None)
        } else {
            Ok(Some(ChunkTag(tag)))
        }
    }

    fn read_chunk_size(&mut self, tag: ChunkTag) -> ReadResult<u32> {
        self.read_field_u32(tag)
    }

    fn read_field_u16(&mut self, tag: ChunkTag) -> ReadResult<u16> {
        self.read_u16::<LittleEndian>().map_err(|err| truncated(tag, err))
    }

    fn read_field_u32(&mut self, tag: ChunkTag) -> ReadResult<u32> {
        self.read_u32::<LittleEndian>().map_err(|err| truncated(tag, err))
    }

    fn read_field_tag(&mut self, tag: ChunkTag) -> ReadResult<ChunkTag> {
        let mut field = [0u8; 4];
        self.read_exact(&mut field).map_err(|err| truncated(tag, err))?;
        Ok(ChunkTag(field))
    }

    fn read_fmt_chunk(&mut self, size: u32) -> ReadResult<FormatChunk> {
        validate_fmt_chunk_is_large_enough(size)?;

        let audio_format = AudioFormat::from_code(self.read_field_u16(ChunkTag::FMT)?);
        let num_channels = self.read_field_u16(ChunkTag::FMT)?;
        let sample_rate = self.read_field_u32(ChunkTag::FMT)?;
        let byte_rate = self.read_field_u32(ChunkTag::FMT)?;
        let block_align = self.read_field_u16(ChunkTag::FMT)?;
        let bits_per_sample = self.read_field_u16(ChunkTag::FMT)?;

        // Anything else in the chunk is skipped by the walker.
        let extensible = if audio_format.code() == FORMAT_EXTENSIBLE && size >= FMT_EXTENSIBLE_SIZE {
            self.read_extensible_format()?
        } else {
            None
        };

        Ok(FormatChunk {
            audio_format,
            num_channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            extensible,
        })
    }

    fn read_extensible_format(&mut self) -> ReadResult<Option<ExtensibleFormat>> {
        let extra_info_size = self.read_field_u16(ChunkTag::FMT)?;
        if extra_info_size < EXTENSIBLE_INFO_SIZE {
            debug!("Extensible \"fmt \" chunk only carries {} bytes of extra info", extra_info_size);
            return Ok(None);
        }

        let valid_bits_per_sample = self.read_field_u16(ChunkTag::FMT)?;
        let channel_mask = self.read_field_u32(ChunkTag::FMT)?;
        let mut sub_format = [0u8; 16];
        self.read_exact(&mut sub_format).map_err(|err| truncated(ChunkTag::FMT, err))?;

        Ok(Some(ExtensibleFormat {
            valid_bits_per_sample,
            channel_mask,
            sub_format,
        }))
    }

    fn read_data_chunk(&mut self,
                       size: u32,
                       format: &FormatChunk,
                       load_samples: bool)
                       -> ReadResult<DataChunk> {
        if !format.audio_format.supports_sample_extraction() {
            warn!("Unsupported audio format 0x{:04X} (only PCM 0x0001 and IEEE float 0x0003 \
                   supported)",
                  format.audio_format.code());
            return Err(ReadError::Format(
                FormatErrorKind::UnsupportedSampleFormat(format.audio_format.code())));
        }

        let offset = self.stream_position()?;
        let samples = if load_samples {
            let mut buf = vec![0u8; size as usize];
            self.read_exact(&mut buf).map_err(|err| truncated(ChunkTag::DATA, err))?;
            Some(buf)
        } else {
            None
        };

        Ok(DataChunk {
            size,
            offset,
            audio_format: format.audio_format,
            bits_per_sample: format.bits_per_sample,
            samples,
        })
    }

    fn read_fact_chunk(&mut self, size: u32) -> ReadResult<FactChunk> {
        if size < FACT_SIZE {
            return Err(ReadError::Format(FormatErrorKind::FactChunkTooShort(size)));
        }
        let sample_count = self.read_field_u32(ChunkTag::FACT)?;
        Ok(FactChunk { sample_count })
    }

    fn read_cue_chunk(&mut self, size: u32) -> ReadResult<CueChunk> {
        if size < 4 {
            return Err(ReadError::Format(FormatErrorKind::CueChunkTooShort {
                declared_points: 0,
                chunk_size: size,
            }));
        }
        let num_cue_points = self.read_field_u32(ChunkTag::CUE)?;
        validate_cue_chunk_is_large_enough(num_cue_points, size)?;

        let mut cue_points = Vec::with_capacity(num_cue_points as usize);
        for _ in 0..num_cue_points {
            cue_points.push(self.read_cue_point()?);
        }

        Ok(CueChunk {
            num_cue_points,
            cue_points,
        })
    }

    fn read_cue_point(&mut self) -> ReadResult<CuePoint> {
        let identifier = self.read_field_u32(ChunkTag::CUE)?;
        let position = self.read_field_u32(ChunkTag::CUE)?;
        let chunk_tag = self.read_field_tag(ChunkTag::CUE)?;

        // We do not currently support cue points for other chunks than "data".
        if chunk_tag != ChunkTag::DATA {
            warn!("Cue point {} refers to the {} chunk", identifier, chunk_tag);
            return Err(ReadError::Format(FormatErrorKind::CuePointNotInData {
                identifier,
                tag: chunk_tag,
            }));
        }

        let chunk_start = self.read_field_u32(ChunkTag::CUE)?;
        let block_start = self.read_field_u32(ChunkTag::CUE)?;
        let sample_offset = self.read_field_u32(ChunkTag::CUE)?;

        Ok(CuePoint {
            identifier,
            position,
            chunk_tag,
            chunk_start,
            block_start,
            sample_offset,
        })
    }

    /// Positions the stream at the tag of the chunk after the one whose
    /// payload starts at `payload_start`, whatever the decoder consumed.
    fn skip_to_next_chunk(&mut self, payload_start: u64, size: u32) -> io::Result<u64> {
        let pad = u64::from(size & 1);
        self.seek(SeekFrom::Start(payload_start + u64::from(size) + pad))
    }
}

impl<T> ReadWaveExt for T where T: Read + Seek {}

// MARK: The chunk walker

#[derive(Default)]
struct WaveParts {
    format: Option<FormatChunk>,
    data: Option<DataChunk>,
    fact: Option<FactChunk>,
    cue: Option<CueChunk>,
    chunks: Vec<ChunkInfo>,
}

/// Parses a whole wave file out of `reader`, starting at its current position.
///
/// Every chunk is walked until fewer than four bytes remain. The first
/// malformed chunk aborts the parse; nothing from a failed parse is returned.
pub fn parse_wave<R>(reader: &mut R, options: &ReadOptions) -> ReadResult<WaveFile>
    where R: Read + Seek
{
    let start = reader.stream_position()?;
    let stream_end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(start))?;

    let riff_size = reader.validate_riff_header()?;
    let mut parts = WaveParts::default();
    let mut offset = start + RIFF_HEADER_SIZE as u64;

    while let Some(tag) = reader.read_tag()? {
        let size = reader.read_chunk_size(tag)?;
        let payload_start = offset + CHUNK_HEADER_SIZE;
        validate_chunk_fits(tag, size, stream_end.saturating_sub(payload_start))?;

        let kind = chunk_kind(tag);
        debug!("{} chunk at offset {}: {} bytes ({:?})", tag, offset, size, kind);

        match kind {
            ChunkKind::Format => {
                // A later "fmt " replaces an earlier one, until the samples
                // it describes have been decoded.
                if parts.data.is_some() {
                    warn!("Found a \"fmt \" chunk after the data chunk at offset {}", offset);
                    return Err(ReadError::Format(FormatErrorKind::FmtAfterData));
                }
                parts.format = Some(reader.read_fmt_chunk(size)?);
            }
            ChunkKind::Data => {
                let format = match parts.format {
                    Some(ref format) => format,
                    None => return Err(ReadError::Format(FormatErrorKind::DataBeforeFmt)),
                };
                parts.data = Some(reader.read_data_chunk(size, format, options.load_samples)?);
            }
            ChunkKind::Fact => parts.fact = Some(reader.read_fact_chunk(size)?),
            ChunkKind::Cue => parts.cue = Some(reader.read_cue_chunk(size)?),
            ChunkKind::Ignored | ChunkKind::Unknown => {}
        }

        parts.chunks.push(ChunkInfo {
            tag,
            kind,
            offset,
            size,
        });
        offset = reader.skip_to_next_chunk(payload_start, size)?;
    }

    let format = match parts.format {
        Some(format) => format,
        None => return Err(ReadError::Format(FormatErrorKind::MissingFmtChunk)),
    };

    Ok(WaveFile {
        riff_size,
        format,
        data: parts.data,
        fact: parts.fact,
        cue: parts.cue,
        chunks: parts.chunks,
    })
}

// MARK: Tests
