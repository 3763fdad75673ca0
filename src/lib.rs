#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod crc;
#[cfg(test)]
mod debug_utils;
pub mod sensirion;
pub mod svm40;

pub use sensirion::{Command, Error};
pub use svm40::{Svm40, Svm40Async};
