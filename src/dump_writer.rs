use std::io;

use crate::SegmentMembership;
use crate::VolumeType;

/// Write a human readable report of membership `m` under `volume_type`:
/// its roles, sizes, form and write quorum predicates.
pub fn membership_report<W: io::Write>(
    w: &mut W,
    m: &SegmentMembership,
    volume_type: VolumeType,
) -> Result<(), io::Error> {
    writeln!(w, "{}", m)?;
    writeln!(w, "  version: {}", m.version())?;
    writeln!(w, "  size: {}, alive size: {}", m.size(), m.alive_size())?;

    match volume_type.segment_form(m) {
        Ok(form) => {
            writeln!(w, "  form: {} ({})", form, volume_type)?;
            writeln!(
                w,
                "    can generate new primary: {}",
                form.can_generate_new_primary()
            )?;
            writeln!(
                w,
                "    safe to become primary with a secondary missing: {}",
                form.safe_to_become_primary_with_a_secondary_missing()
            )?;
        }
        Err(e) => {
            writeln!(w, "  form: {}", e)?;
        }
    }

    let wq = volume_type.write_quorum_size();
    writeln!(w, "  write quorum: {}", wq)?;
    writeln!(
        w,
        "    durable if every member acks: {}",
        !m.check_bad_write_result(wq, 0, 0, 0)
    )?;
    writeln!(
        w,
        "    lost if one secondary fails: {}",
        m.check_bad_write_result(wq, 1, 0, 0)
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use crate::dump_writer::membership_report;
    use crate::testing::ids;
    use crate::testing::membership;
    use crate::VolumeType;

    #[test]
    fn test_membership_report() -> Result<(), std::io::Error> {
        let m = membership((1, 2), 1, &[2]).with_arbiters(ids(&[3]));

        let mut buf = Vec::new();
        membership_report(&mut buf, &m, VolumeType::Small)?;

        let want = indoc! {"
            SegmentMembership{SegmentVersion(epoch=1, generation=2), primary=1, temp_primary=None, secondaries=[2], arbiters=[3]}
              version: SegmentVersion(epoch=1, generation=2)
              size: 3, alive size: 3
              form: PSA (SMALL)
                can generate new primary: true
                safe to become primary with a secondary missing: false
              write quorum: 2
                durable if every member acks: true
                lost if one secondary fails: true
        "};
        assert_eq!(want, String::from_utf8_lossy(&buf));

        let mut buf = Vec::new();
        membership_report(&mut buf, &m, VolumeType::Regular)?;
        let got = String::from_utf8_lossy(&buf).to_string();
        assert!(got.contains("form: Invalid segment shape for REGULAR"), "{}", got);

        Ok(())
    }
}
