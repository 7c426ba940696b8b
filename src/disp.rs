mod display_ids;
mod display_option;

pub(crate) use display_ids::DisplayIds;
pub(crate) use display_option::DisplayOption;
