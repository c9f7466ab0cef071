//! Random identifier generation.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Default identifier length for generated entity ids.
pub const DEFAULT_ID_LEN: usize = 8;

/// Generates a random alphanumeric identifier of `len` characters.
pub fn generate_id(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
