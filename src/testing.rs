use std::any::type_name;
use std::fmt::Debug;
use std::io;

use codeq::Codec;

use crate::InstanceId;
use crate::SegmentForm;
use crate::SegmentMembership;
use crate::SegmentVersion;

/// Create an instance id
#[allow(dead_code)]
pub(crate) fn id(x: u64) -> InstanceId {
    InstanceId(x)
}

/// Create a list of instance ids
#[allow(dead_code)]
pub(crate) fn ids(xs: &[u64]) -> Vec<InstanceId> {
    xs.iter().copied().map(InstanceId).collect()
}

/// Create a membership of `primary` and `secondaries` at version `(epoch,
/// generation)`.
#[allow(dead_code)]
pub(crate) fn membership(
    version: (u64, u64),
    primary: u64,
    secondaries: &[u64],
) -> SegmentMembership {
    SegmentMembership::new(
        SegmentVersion::from(version),
        InstanceId(primary),
        ids(secondaries),
    )
}

/// Build a membership with the shape named by `form`.
///
/// The primary is 1, secondaries are numbered from 10, arbiters from 20,
/// inactive secondaries from 30 and joining secondaries from 40.
#[allow(dead_code)]
pub(crate) fn membership_of_form(form: SegmentForm) -> SegmentMembership {
    let (s, j, i, a) = form.counts();

    let range = |base: u64, n: usize| (base..base + n as u64).map(InstanceId);

    SegmentMembership::new(SegmentVersion::new(1, 0), InstanceId(1), range(10, s))
        .with_arbiters(range(20, a))
        .with_inactive_secondaries(range(30, i))
        .with_joining_secondaries(range(40, j))
}

#[allow(dead_code)]
pub fn test_codec_without_corruption<D: Codec + PartialEq + Debug>(
    encoded_bytes: &[u8],
    v: &D,
) -> Result<(), io::Error> {
    let mes = format!("Type: {} encoded data: {:?}", type_name::<D>(), encoded_bytes);

    // Test encoding
    {
        let mut b = Vec::new();
        let n = v.encode(&mut b)?;
        assert_eq!(n, b.len(), "output len, {}", &mes);
        assert_eq!(b, encoded_bytes, "output data, {}", &mes);
    }

    // Assert the input is correct
    {
        let b = encoded_bytes.to_vec();
        let decoded = D::decode(&mut b.as_slice())?;
        assert_eq!(v, &decoded, "decode, {}", &mes);
    }

    Ok(())
}

/// Create a string
#[allow(dead_code)]
pub(crate) fn ss(x: impl ToString) -> String {
    x.to_string()
}
