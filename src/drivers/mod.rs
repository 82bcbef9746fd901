//! Hardware drivers.
//!
//! Only the relay driver lives here — sensor acquisition and the radio
//! link belong to the sensing unit and transport collaborators, not
//! this firmware.

pub mod relay;
