//! Crate-level tests spanning encoding and decoding.

mod round_trip;
