//! Basic type definitions for the chat server
//!
//! Provides:
//! - `ClientId`: UUID-based session identifier, stable across nickname changes
//! - nickname format rules and placeholder nickname generation

use rand::Rng;
use uuid::Uuid;

/// Prefix of the nickname every client starts with
pub const PLACEHOLDER_PREFIX: &str = "anonymous";

/// Upper bound (exclusive) of the random placeholder suffix
const PLACEHOLDER_RANGE: u32 = 1000;

/// Random draws attempted before falling back to a session-derived suffix
const PLACEHOLDER_ATTEMPTS: usize = 16;

/// Unique client identifier (newtype pattern)
///
/// Assigned once per connection. Room membership and ownership are keyed by
/// this value, so renaming a client never invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert an identifier to UpperCamelCase
///
/// Separators (`_`, `-`, `.`, space) start a new word, a digit capitalizes the
/// letter after it, and runs of capitals are folded (`ABC` -> `Abc`). Any
/// other character is dropped.
pub fn to_camel_case(input: &str) -> String {
    let input = input.trim();
    let mut out = String::with_capacity(input.len());
    let mut cap_next = true;
    let mut prev_is_cap = false;

    for (i, byte) in input.bytes().enumerate() {
        let is_cap = byte.is_ascii_uppercase();
        let is_low = byte.is_ascii_lowercase();

        let mut ch = byte;
        if cap_next {
            ch = ch.to_ascii_uppercase();
        } else if i == 0 || (prev_is_cap && is_cap) {
            ch = ch.to_ascii_lowercase();
        }
        prev_is_cap = is_cap;

        if is_cap || is_low {
            out.push(ch as char);
            cap_next = false;
        } else if byte.is_ascii_digit() {
            out.push(ch as char);
            cap_next = true;
        } else {
            cap_next = matches!(byte, b'_' | b' ' | b'-' | b'.');
        }
    }
    out
}

/// Check whether a requested nickname has the canonical format
///
/// A valid nickname is non-empty and already in UpperCamelCase form.
pub fn is_valid_nickname(nickname: &str) -> bool {
    !nickname.is_empty() && to_camel_case(nickname) == nickname
}

/// Generate a placeholder nickname not rejected by `is_taken`
///
/// Draws `anonymous<N>` with `N` in `0..1000`; if every draw collides the
/// suffix is taken from the session identifier instead.
pub fn placeholder_nickname<F>(client_id: ClientId, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut rng = rand::thread_rng();
    for _ in 0..PLACEHOLDER_ATTEMPTS {
        let candidate = format!("{}{}", PLACEHOLDER_PREFIX, rng.gen_range(0..PLACEHOLDER_RANGE));
        if !is_taken(&candidate) {
            return candidate;
        }
    }
    format!("{}{}", PLACEHOLDER_PREFIX, client_id.0.simple())
}
