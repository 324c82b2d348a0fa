//! Utility modules

pub mod gm_instruments;

pub use gm_instruments::{program_name, PERCUSSION_CHANNEL};
