//! Interfaces between the volume state machines and the layer that tracks
//! segments.

pub mod volume_view;
