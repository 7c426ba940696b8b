use std::fmt;

/// Display an optional value, or `None` when absent.
pub(crate) struct DisplayOption<'a, T>(pub(crate) Option<&'a T>);

impl<T> fmt::Display for DisplayOption<'_, T>
where T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "None"),
        }
    }
}
