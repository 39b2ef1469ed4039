use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sha2::{Digest, Sha256};

/// Code alphabet: lowercase, uppercase, digits (62 symbols).
/// Order matters for the deterministic strategy; the first symbol is the
/// left-pad character.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// How short codes are produced when the caller doesn't supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStrategy {
    /// Fresh random code per URL (the default).
    Random,
    /// Hash-derived code: the same URL always maps to the same code.
    Hash,
}

/// Generate a random short code of exactly `length` characters from
/// `[A-Za-z0-9]`. Uniqueness against existing codes is the caller's concern.
///
/// `thread_rng` is a CSPRNG (ChaCha-based, reseeded from the OS).
pub fn generate_random(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Derive a short code from a SHA-256 hash of the URL. Pure and
/// deterministic: identical `url` and `length` always yield the same code.
///
/// The leading four digest bytes are read as a big-endian integer and
/// converted to base 62, most-significant symbol first; if the integer runs
/// out before `length` symbols, the code is left-padded with `a`.
pub fn generate_deterministic(url: &str, length: usize) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut n = u64::from(u32::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3],
    ]));

    let base = ALPHABET.len() as u64;
    let mut code = String::with_capacity(length);
    while n > 0 && code.len() < length {
        code.insert(0, ALPHABET[(n % base) as usize] as char);
        n /= base;
    }
    while code.len() < length {
        code.insert(0, ALPHABET[0] as char);
    }

    code
}
