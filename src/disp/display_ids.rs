use std::collections::BTreeSet;
use std::fmt;

use crate::InstanceId;

/// Display a set of instance ids as `[1, 2, 3]`.
pub(crate) struct DisplayIds<'a>(pub(crate) &'a BTreeSet<InstanceId>);

impl fmt::Display for DisplayIds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "]")
    }
}
