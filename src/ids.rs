//! Public session identifiers.
//!
//! A session id is the sanitized recipient name followed by a short random
//! base-36 suffix, e.g. `sam-lee-4k2x9q`. The suffix only makes collisions
//! unlikely; uniqueness is enforced by the sessions table.

use rand::Rng;

const SUFFIX_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
pub const SUFFIX_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 30;
/// Upper bound on the length of a generated id.
pub const MAX_ID_LEN: usize = MAX_NAME_LEN + 1 + SUFFIX_LEN;

/// Lowercase, map everything outside `[a-z0-9]` to `-`, collapse runs of `-`
/// and cut to [`MAX_NAME_LEN`] characters.
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len().min(MAX_NAME_LEN));
    for ch in name.chars().flat_map(char::to_lowercase) {
        let mapped = if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            ch
        } else {
            '-'
        };
        if mapped == '-' && sanitized.ends_with('-') {
            continue;
        }
        sanitized.push(mapped);
    }
    // Only ASCII was pushed, so byte length equals char count.
    sanitized.truncate(MAX_NAME_LEN);
    sanitized
}

pub fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect()
}

pub fn generate_session_id_with<R: Rng>(name: &str, rng: &mut R) -> String {
    format!("{}-{}", sanitize_name(name), random_suffix(rng))
}

pub fn generate_session_id(name: &str) -> String {
    generate_session_id_with(name, &mut rand::thread_rng())
}

/// True when `value` could have been produced by [`generate_session_id`].
pub fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
