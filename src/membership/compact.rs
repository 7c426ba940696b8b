//! Compact one-line text form of a membership:
//!
//! `epoch,generation,primary,temp_primary,secondaries,arbiters,inactive,joining,primary_candidate,secondary_candidate`
//!
//! Role sets are `:`-separated ids, empty when the set is empty. An absent
//! optional id is written as `-1`.

use std::collections::BTreeSet;

use crate::errors::InvalidMembership;
use crate::InstanceId;
use crate::SegmentMembership;
use crate::SegmentVersion;

const ABSENT: &str = "-1";

fn format_ids(ids: &BTreeSet<InstanceId>) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(":")
}

fn format_optional(id: Option<InstanceId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => ABSENT.to_string(),
    }
}

fn parse_u64(field: &str, name: &str) -> Result<u64, InvalidMembership> {
    field.parse::<u64>().map_err(|e| {
        InvalidMembership::new(format!("bad {}: {:?}: {}", name, field, e))
    })
}

fn parse_optional(
    field: &str,
    name: &str,
) -> Result<Option<InstanceId>, InvalidMembership> {
    if field == ABSENT {
        return Ok(None);
    }
    parse_u64(field, name).map(|x| Some(InstanceId(x)))
}

fn parse_ids(
    field: &str,
    name: &str,
) -> Result<BTreeSet<InstanceId>, InvalidMembership> {
    if field.is_empty() {
        return Ok(BTreeSet::new());
    }

    field.split(':').map(|x| parse_u64(x, name).map(InstanceId)).collect()
}

impl SegmentMembership {
    pub fn to_compact_string(&self) -> String {
        [
            self.version.epoch.to_string(),
            self.version.generation.to_string(),
            self.primary.to_string(),
            format_optional(self.temp_primary),
            format_ids(&self.secondaries),
            format_ids(&self.arbiters),
            format_ids(&self.inactive_secondaries),
            format_ids(&self.joining_secondaries),
            format_optional(self.primary_candidate),
            format_optional(self.secondary_candidate),
        ]
        .join(",")
    }

    pub fn from_compact_string(s: &str) -> Result<Self, InvalidMembership> {
        let fields = s.trim().split(',').collect::<Vec<_>>();

        let [epoch, generation, primary, temp_primary, secondaries, arbiters, inactive, joining, primary_candidate, secondary_candidate] =
            fields[..]
        else {
            return Err(InvalidMembership::new(format!(
                "expect 10 fields, got {}: {:?}",
                fields.len(),
                s
            )));
        };

        let version = SegmentVersion::new(
            parse_u64(epoch, "epoch")?,
            parse_u64(generation, "generation")?,
        );

        let m = Self {
            version,
            primary: InstanceId(parse_u64(primary, "primary")?),
            temp_primary: parse_optional(temp_primary, "temp_primary")?,
            secondaries: parse_ids(secondaries, "secondaries")?,
            arbiters: parse_ids(arbiters, "arbiters")?,
            inactive_secondaries: parse_ids(inactive, "inactive_secondaries")?,
            joining_secondaries: parse_ids(joining, "joining_secondaries")?,
            secondary_candidate: parse_optional(
                secondary_candidate,
                "secondary_candidate",
            )?,
            primary_candidate: parse_optional(
                primary_candidate,
                "primary_candidate",
            )?,
        };

        m.validate()?;
        Ok(m)
    }
}
