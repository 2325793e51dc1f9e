//! Shared helpers for unit tests.

use rand::{CryptoRng, RngCore};

/// An entropy source whose fallible draw always fails.
pub(crate) struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        panic!("infallible draw from FailingRng")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("infallible draw from FailingRng")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("infallible draw from FailingRng")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        Err(rand::Error::new(std::io::Error::other("entropy unavailable")))
    }
}

impl CryptoRng for FailingRng {}
