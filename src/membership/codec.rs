//! Binary record of a membership.
//!
//! Layout, big-endian:
//! - 1 byte: format version
//! - 8 + 8 bytes: epoch, generation
//! - 8 bytes: primary
//! - optional temp primary, secondary candidate, primary candidate: a
//!   presence byte followed by 8 bytes when present
//! - secondaries, arbiters, inactive and joining secondaries: each a 4 bytes
//!   count followed by 8 bytes per id, ascending
//! - 8 bytes: checksum

use std::collections::BTreeSet;
use std::io;

use byteorder::BigEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use codeq::ChecksumReader;
use codeq::ChecksumWriter;
use codeq::Decode;
use codeq::Encode;

use crate::types::Checksum;
use crate::InstanceId;
use crate::SegmentMembership;
use crate::SegmentVersion;

impl Encode for InstanceId {
    fn encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        w.write_u64::<BigEndian>(self.0)?;
        Ok(8)
    }
}

impl Decode for InstanceId {
    fn decode<R: io::Read>(mut r: R) -> Result<Self, io::Error> {
        Ok(InstanceId(r.read_u64::<BigEndian>()?))
    }
}

impl Encode for SegmentVersion {
    fn encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        w.write_u64::<BigEndian>(self.epoch)?;
        w.write_u64::<BigEndian>(self.generation)?;
        Ok(16)
    }
}

impl Decode for SegmentVersion {
    fn decode<R: io::Read>(mut r: R) -> Result<Self, io::Error> {
        let epoch = r.read_u64::<BigEndian>()?;
        let generation = r.read_u64::<BigEndian>()?;
        Ok(Self::new(epoch, generation))
    }
}

fn encode_ids<W: io::Write>(
    ids: &BTreeSet<InstanceId>,
    mut w: W,
) -> Result<usize, io::Error> {
    let len = u32::try_from(ids.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "too many ids in a role set")
    })?;

    w.write_u32::<BigEndian>(len)?;
    let mut n = 4;

    for id in ids {
        n += id.encode(&mut w)?;
    }
    Ok(n)
}

fn decode_ids<R: io::Read>(mut r: R) -> Result<BTreeSet<InstanceId>, io::Error> {
    let len = r.read_u32::<BigEndian>()?;

    let mut ids = BTreeSet::new();
    for _ in 0..len {
        ids.insert(InstanceId::decode(&mut r)?);
    }
    Ok(ids)
}

impl Encode for SegmentMembership {
    fn encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        let mut n = 0;
        let mut cw = ChecksumWriter::<Checksum, _>::new(&mut w);

        let ver = 1u8;
        n += ver.encode(&mut cw)?;

        n += self.version.encode(&mut cw)?;
        n += self.primary.encode(&mut cw)?;

        n += self.temp_primary.encode(&mut cw)?;
        n += self.secondary_candidate.encode(&mut cw)?;
        n += self.primary_candidate.encode(&mut cw)?;

        n += encode_ids(&self.secondaries, &mut cw)?;
        n += encode_ids(&self.arbiters, &mut cw)?;
        n += encode_ids(&self.inactive_secondaries, &mut cw)?;
        n += encode_ids(&self.joining_secondaries, &mut cw)?;

        n += cw.write_checksum()?;

        Ok(n)
    }
}

impl Decode for SegmentMembership {
    fn decode<R: io::Read>(r: R) -> Result<Self, io::Error> {
        let mut cr = ChecksumReader::<Checksum, _>::new(r);

        let ver: u8 = Decode::decode(&mut cr)?;

        let m = match ver {
            1 => Self {
                version: Decode::decode(&mut cr)?,
                primary: Decode::decode(&mut cr)?,
                temp_primary: Decode::decode(&mut cr)?,
                secondary_candidate: Decode::decode(&mut cr)?,
                primary_candidate: Decode::decode(&mut cr)?,
                secondaries: decode_ids(&mut cr)?,
                arbiters: decode_ids(&mut cr)?,
                inactive_secondaries: decode_ids(&mut cr)?,
                joining_secondaries: decode_ids(&mut cr)?,
            },
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Unsupported SegmentMembership version: {}", ver),
                ));
            }
        };

        cr.verify_checksum(|| "SegmentMembership::decode()")?;

        m.validate()?;
        Ok(m)
    }
}
