//! Byte, string and bit-string generators.
//!
//! Lengths are drawn from `[min, max)`; equal bounds give exactly `min`.

use rand::Rng;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn pick_length<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    if min == max {
        min
    } else {
        rng.random_range(min..max)
    }
}

/// Generate random bytes.
pub fn generate_bytes<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; pick_length(rng, min, max)];
    rng.fill(bytes.as_mut_slice());
    bytes
}

/// Generate a random ASCII alphanumeric string.
pub fn generate_string<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> String {
    let len = pick_length(rng, min, max);
    (0..len)
        .map(|_| ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}

/// Generate a random string of `0` and `1` characters.
pub fn generate_bit_string<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> String {
    let len = pick_length(rng, min, max);
    (0..len)
        .map(|_| if rng.random_bool(0.5) { '1' } else { '0' })
        .collect()
}
