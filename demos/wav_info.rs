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

use std::path::PathBuf;
use std::process;

use clap::Parser;
use riff_wave_reader::{ReadOptions, ReadResult, Reader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Prints what a wave file contains", long_about = None)]
struct CommandArgs {
    /// Wave file to inspect.
    path: PathBuf,

    /// Only record where the sample data is, instead of loading it.
    #[arg(long)]
    no_samples: bool,
}

fn main() {
    let args = CommandArgs::parse();
    if let Err(err) = print_info(&args) {
        eprintln!("{}: {} ({:?})", args.path.display(), err, err.class());
        process::exit(1);
    }
}

fn print_info(args: &CommandArgs) -> ReadResult<()> {
    let options = ReadOptions::new().load_samples(!args.no_samples);
    let mut reader = Reader::with_path(&args.path).with_options(options);
    reader.open()?;

    println!("format:          {}", reader.audio_format());
    println!("channels:        {}", reader.num_channels());
    println!("sample rate:     {}", reader.sample_rate());
    println!("bits per sample: {}", reader.bits_per_sample());

    let wave = match reader.wave() {
        Some(wave) => wave,
        None => return Ok(()),
    };
    if let Some(data) = wave.data() {
        println!("data:            {} bytes at offset {}", data.size(), data.offset());
    }
    if let Some(sample_count) = wave.sample_count() {
        println!("fact samples:    {}", sample_count);
    }
    if let Some(duration) = wave.duration_secs() {
        println!("duration:        {:.3} s", duration);
    }

    for point in wave.cue_points() {
        println!("cue {:>4}:        sample {}", point.identifier, point.sample_offset);
    }

    println!("chunks:");
    for chunk in wave.chunks() {
        println!("  {:<8} {:>10} bytes at {:<8} {:?}",
                 format!("{}", chunk.tag),
                 chunk.size,
                 chunk.offset,
                 chunk.kind);
    }

    Ok(())
}
