//! Core simulation for DODGE, a missile-dodging arcade game.
//!
//! The library is presentation-free: everything here operates on a
//! fixed 800×600 logical canvas and plain timestamps in milliseconds.
//! The binary maps the canvas onto a terminal and feeds in frame
//! timestamps; tests feed in synthetic ones.

pub mod compute;
pub mod entities;
