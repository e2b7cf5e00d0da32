//! Generic types and units for frequencies.
//!
//! This is a re-export of parts of the [fugit] crate.

pub use fugit::HertzU32 as Hertz;
pub use fugit::KilohertzU32 as Kilohertz;
pub use fugit::MegahertzU32 as Megahertz;

pub use fugit::RateExtU32;
