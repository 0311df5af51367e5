//! Opaque entity id tokens.
//!
//! Ids are short random tokens, minted at the maximum accepted length.
//! Clients may label them with an entity-kind prefix for display; the token
//! stored and validated here is the bare 5-8 character form.

use rand::Rng;

/// Minimum accepted id length, applied to the full token as received
pub const MIN_ID_LEN: usize = 5;
/// Maximum accepted id length; also the minted length
pub const MAX_ID_LEN: usize = 8;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Mint a fresh entity id
pub fn mint_id() -> String {
    let mut rng = rand::thread_rng();
    (0..MAX_ID_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Check an id received from a client
pub fn is_valid_id(id: &str) -> bool {
    (MIN_ID_LEN..=MAX_ID_LEN).contains(&id.len())
        && id.bytes().all(|b| b.is_ascii_alphanumeric())
}
