use std::fs;
use std::io;
use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use codeq::Decode;
use segment_membership::dump_writer;
use segment_membership::SegmentMembership;
use segment_membership::VolumeType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Json,
    Compact,
    Binary,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::Parser)]
#[clap(about = "dump a segment membership", author)]
pub struct Args {
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Encoding of the membership in the file.
    #[arg(long, value_enum, default_value = "json")]
    format: Format,

    /// Volume type to classify the membership under.
    #[arg(long, default_value = "regular")]
    volume_type: VolumeType,
}

fn read_membership(args: &Args) -> Result<SegmentMembership, io::Error> {
    let m = match args.format {
        Format::Json => SegmentMembership::from_json(&fs::read_to_string(&args.path)?)?,
        Format::Compact => {
            SegmentMembership::from_compact_string(&fs::read_to_string(&args.path)?)?
        }
        Format::Binary => {
            let buf = fs::read(&args.path)?;
            SegmentMembership::decode(&mut buf.as_slice())?
        }
    };
    Ok(m)
}

fn main() -> Result<(), io::Error> {
    let args = Args::parse();

    let m = read_membership(&args)?;
    dump_writer::membership_report(&mut stdout(), &m, args.volume_type)?;

    Ok(())
}
