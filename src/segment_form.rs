//! Catalog of membership shapes.
//!
//! A form names which role categories of a membership are populated and how
//! many members each holds: `P` the primary, `S` a secondary, `J` a joining
//! secondary, `I` an inactive secondary and `A` an arbiter. The forms prefixed
//! with `T` belong to the scheme with one secondary and one arbiter, when the
//! arbiter is missing.

use std::fmt;
use std::str::FromStr;

use crate::errors::ShapeError;
use crate::errors::UnknownName;
use crate::SegmentMembership;
use crate::VolumeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum SegmentForm {
    // Regular: primary and two secondaries.
    PSS,
    PSJ,
    PSI,
    PJI,
    PJJ,
    PII,
    PS,
    PJ,
    PI,

    // Small: primary, one secondary and one arbiter.
    PSA,
    PJA,
    PIA,
    PA,
    TPS,
    TPJ,
    TPI,

    // Large: primary, two secondaries and two arbiters.
    PSSAA,
    PSSAI,
    PSSII,
    PSJAA,
    PSJAI,
    PSJII,
    PSIAA,
    PSIAI,
    PSIII,
    PJJAA,
    PJJAI,
    PJJII,
    PJIAA,
    PJIAI,
    PJIII,
    PIIAA,
    PIIAI,
    PIIII,
    PSAA,
    PSAI,
    PSII,
    PIAA,
    PIAI,
    PIII,
    PJAA,
    PJAI,
    PJII,
    PAA,
}

use SegmentForm::*;

/// Role counts `(secondaries, joining, inactive, arbiters)` of every form,
/// keyed by the scheme it belongs to.
///
/// A form may appear more than once when several shapes share a name.
const CATALOG: &[(VolumeType, [usize; 4], SegmentForm)] = &[
    (VolumeType::Regular, [2, 0, 0, 0], PSS),
    (VolumeType::Regular, [1, 1, 0, 0], PSJ),
    (VolumeType::Regular, [1, 0, 1, 0], PSI),
    (VolumeType::Regular, [0, 1, 1, 0], PJI),
    (VolumeType::Regular, [0, 2, 0, 0], PJJ),
    (VolumeType::Regular, [0, 0, 2, 0], PII),
    (VolumeType::Regular, [1, 0, 0, 0], PS),
    (VolumeType::Regular, [0, 1, 0, 0], PJ),
    (VolumeType::Regular, [0, 0, 1, 0], PI),
    //
    (VolumeType::Small, [1, 0, 0, 1], PSA),
    (VolumeType::Small, [0, 1, 0, 1], PJA),
    (VolumeType::Small, [0, 0, 1, 1], PIA),
    (VolumeType::Small, [0, 0, 0, 1], PA),
    (VolumeType::Small, [1, 0, 0, 0], TPS),
    (VolumeType::Small, [1, 0, 1, 0], TPS),
    (VolumeType::Small, [0, 1, 0, 0], TPJ),
    (VolumeType::Small, [0, 1, 1, 0], TPJ),
    (VolumeType::Small, [0, 0, 1, 0], TPI),
    (VolumeType::Small, [0, 0, 2, 0], TPI),
    //
    (VolumeType::Large, [2, 0, 0, 2], PSSAA),
    (VolumeType::Large, [2, 0, 1, 1], PSSAI),
    (VolumeType::Large, [2, 0, 2, 0], PSSII),
    (VolumeType::Large, [1, 1, 0, 2], PSJAA),
    (VolumeType::Large, [1, 1, 1, 1], PSJAI),
    (VolumeType::Large, [1, 1, 2, 0], PSJII),
    (VolumeType::Large, [1, 0, 1, 2], PSIAA),
    (VolumeType::Large, [1, 0, 2, 1], PSIAI),
    (VolumeType::Large, [1, 0, 3, 0], PSIII),
    (VolumeType::Large, [0, 2, 0, 2], PJJAA),
    (VolumeType::Large, [0, 2, 1, 1], PJJAI),
    (VolumeType::Large, [0, 2, 2, 0], PJJII),
    (VolumeType::Large, [0, 1, 1, 2], PJIAA),
    (VolumeType::Large, [0, 1, 2, 1], PJIAI),
    (VolumeType::Large, [0, 1, 3, 0], PJIII),
    (VolumeType::Large, [0, 0, 2, 2], PIIAA),
    (VolumeType::Large, [0, 0, 3, 1], PIIAI),
    (VolumeType::Large, [0, 0, 4, 0], PIIII),
    (VolumeType::Large, [1, 0, 0, 2], PSAA),
    (VolumeType::Large, [1, 0, 1, 1], PSAI),
    (VolumeType::Large, [1, 0, 2, 0], PSII),
    (VolumeType::Large, [0, 0, 1, 2], PIAA),
    (VolumeType::Large, [0, 0, 2, 1], PIAI),
    (VolumeType::Large, [0, 0, 3, 0], PIII),
    (VolumeType::Large, [0, 1, 0, 2], PJAA),
    (VolumeType::Large, [0, 1, 1, 1], PJAI),
    (VolumeType::Large, [0, 1, 2, 0], PJII),
    (VolumeType::Large, [0, 0, 0, 2], PAA),
];

impl SegmentForm {
    pub const ALL: [SegmentForm; 44] = [
        PSS, PSJ, PSI, PJI, PJJ, PII, PS, PJ, PI, //
        PSA, PJA, PIA, PA, TPS, TPJ, TPI, //
        PSSAA, PSSAI, PSSII, PSJAA, PSJAI, PSJII, PSIAA, PSIAI, PSIII, //
        PJJAA, PJJAI, PJJII, PJIAA, PJIAI, PJIII, PIIAA, PIIAI, PIIII, //
        PSAA, PSAI, PSII, PIAA, PIAI, PIII, PJAA, PJAI, PJII, PAA,
    ];

    /// Classify `membership` under `volume_type`.
    ///
    /// Inactive secondaries beyond the slots left by the other roles are
    /// bookkeeping only and do not change the shape.
    pub fn classify(
        membership: &SegmentMembership,
        volume_type: VolumeType,
    ) -> Result<Self, ShapeError> {
        let s = membership.secondaries().len();
        let j = membership.joining_secondaries().len();
        let a = membership.arbiters().len();
        let inactive = membership.inactive_secondaries().len();

        let err = |reason: &str| {
            ShapeError::new(volume_type, (s, j, inactive, a), reason)
        };

        if a > volume_type.num_arbiters() {
            return Err(if volume_type.num_arbiters() == 0 {
                err("arbiter present in a scheme without arbiters")
            } else {
                err("too many arbiters")
            });
        }

        let slots = volume_type.num_members() - 1;
        if s + j + a > slots {
            return Err(err("too many members"));
        }

        let i = inactive.min(slots - s - j - a);
        let counts = [s, j, i, a];

        CATALOG
            .iter()
            .find(|(t, c, _)| *t == volume_type && *c == counts)
            .map(|(_, _, form)| *form)
            .ok_or_else(|| err("shape not in catalog"))
    }

    /// The scheme this form belongs to.
    pub fn volume_type(&self) -> VolumeType {
        self.entry().0
    }

    /// Role counts `(secondaries, joining, inactive, arbiters)` of the
    /// smallest membership of this form.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let [s, j, i, a] = self.entry().1;
        (s, j, i, a)
    }

    fn entry(&self) -> (VolumeType, [usize; 4]) {
        CATALOG
            .iter()
            .find(|(_, _, f)| f == self)
            .map(|(t, c, _)| (*t, *c))
            .unwrap_or_else(|| unreachable!("every form is in the catalog"))
    }

    /// Whether a membership of this form still has a secondary holding all
    /// data, one that can be elected as the next primary.
    pub fn can_generate_new_primary(&self) -> bool {
        matches!(
            self,
            PSS | PSJ
                | PSI
                | PSA
                | PSSAA
                | PSSAI
                | PSSII
                | PSJAA
                | PSJAI
                | PSJII
                | PSIAA
                | PSIAI
                | PSAA
                | PSAI
        )
    }

    /// Whether the primary is the only member holding data.
    pub fn only_primary(&self) -> bool {
        matches!(self, PII | PI | PIA | PA | TPI | PIIAA | PIAA | PAA)
    }

    /// Whether a secondary may become primary while another secondary is
    /// missing. Not the case when the arbiters would be the only voters left
    /// beside it.
    pub fn safe_to_become_primary_with_a_secondary_missing(&self) -> bool {
        !matches!(self, PSA | PSSAA)
    }
}

impl fmt::Display for SegmentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for SegmentForm {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.to_string() == s)
            .ok_or_else(|| UnknownName::new("segment form", s))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use crate::testing::ids;
    use crate::testing::membership;
    use crate::testing::membership_of_form;
    use crate::SegmentForm;
    use crate::VolumeType;

    #[test]
    fn test_every_form_classifies_to_itself() {
        for form in SegmentForm::ALL {
            let m = membership_of_form(form);
            assert_eq!(Ok(form), SegmentForm::classify(&m, form.volume_type()));
        }
    }

    #[test]
    fn test_form_names() {
        let names = SegmentForm::ALL
            .iter()
            .map(|f| f.to_string())
            .collect::<BTreeSet<_>>();
        assert_eq!(44, names.len());

        for form in SegmentForm::ALL {
            assert_eq!(Ok(form), form.to_string().parse::<SegmentForm>());
        }

        assert_eq!(
            "Unknown segment form name: \"PSX\"",
            "PSX".parse::<SegmentForm>().unwrap_err().to_string()
        );
    }

    #[test]
    fn test_classify_regular() {
        let m = membership((1, 0), 1, &[2, 3]);
        assert_eq!(Ok(SegmentForm::PSS), VolumeType::Regular.segment_form(&m));

        let m = membership((1, 0), 1, &[2]).with_inactive_secondaries(ids(&[3]));
        assert_eq!(Ok(SegmentForm::PSI), VolumeType::Regular.segment_form(&m));

        // Extra inactive secondaries do not change the shape.
        let m = membership((1, 0), 1, &[2]).with_inactive_secondaries(ids(&[3, 4, 5]));
        assert_eq!(Ok(SegmentForm::PSI), VolumeType::Regular.segment_form(&m));

        // The primary alone is not a valid shape.
        let m = membership((1, 0), 1, &[]);
        assert!(VolumeType::Regular.segment_form(&m).is_err());

        let m = membership((1, 0), 1, &[2, 3, 4]);
        assert_eq!(
            "too many members",
            VolumeType::Regular.segment_form(&m).unwrap_err().reason
        );
    }

    #[test]
    fn test_arbiters_only_in_arbiter_schemes() {
        let m = membership((1, 0), 1, &[2]).with_arbiters(ids(&[3]));

        let err = VolumeType::Regular.segment_form(&m).unwrap_err();
        assert_eq!("arbiter present in a scheme without arbiters", err.reason);
        assert_eq!(1, err.arbiters);

        assert_eq!(Ok(SegmentForm::PSA), VolumeType::Small.segment_form(&m));

        let m = membership((1, 0), 1, &[]).with_arbiters(ids(&[3, 4]));
        assert!(VolumeType::Small.segment_form(&m).is_err());
        assert_eq!(Ok(SegmentForm::PAA), VolumeType::Large.segment_form(&m));
    }

    #[test]
    fn test_classify_small_aliases() {
        let m = membership((1, 0), 1, &[2]);
        assert_eq!(Ok(SegmentForm::TPS), VolumeType::Small.segment_form(&m));

        let m = m.with_inactive_secondaries(ids(&[3]));
        assert_eq!(Ok(SegmentForm::TPS), VolumeType::Small.segment_form(&m));

        let m = membership((1, 0), 1, &[]).with_inactive_secondaries(ids(&[3, 4]));
        assert_eq!(Ok(SegmentForm::TPI), VolumeType::Small.segment_form(&m));
    }

    #[test]
    fn test_classify_large() {
        let m = membership((1, 0), 1, &[2, 3]).with_arbiters(ids(&[4, 5]));
        assert_eq!(Ok(SegmentForm::PSSAA), VolumeType::Large.segment_form(&m));

        let m = membership((1, 0), 1, &[2])
            .with_joining_secondaries(ids(&[3]))
            .with_inactive_secondaries(ids(&[6, 7, 8]))
            .with_arbiters(ids(&[4]));
        assert_eq!(Ok(SegmentForm::PSJAI), VolumeType::Large.segment_form(&m));

        // Two secondaries plus a joining one exceed the secondary slots.
        let m = membership((1, 0), 1, &[2, 3]).with_joining_secondaries(ids(&[4]));
        assert!(VolumeType::Large.segment_form(&m).is_err());
    }

    #[test]
    fn test_form_predicates() {
        let can = SegmentForm::ALL
            .into_iter()
            .filter(|f| f.can_generate_new_primary())
            .count();
        assert_eq!(14, can);

        assert!(SegmentForm::PSS.can_generate_new_primary());
        assert!(!SegmentForm::PJJ.can_generate_new_primary());

        assert!(SegmentForm::PA.only_primary());
        assert!(!SegmentForm::PJA.only_primary());

        assert!(!SegmentForm::PSA.safe_to_become_primary_with_a_secondary_missing());
        assert!(SegmentForm::PSS.safe_to_become_primary_with_a_secondary_missing());
    }
}
