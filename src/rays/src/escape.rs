//! JSON escape normalisation
//!
//! The structural renderers build JSON with a C-style string escaper, which
//! emits `\v` and `\xNN` for some control bytes. Neither form is legal JSON,
//! so every text payload is passed through [`standardize`] before it crosses
//! the boundary.

use serde::Serialize;

use crate::Result;

/// Rewrite non-strict escapes into their `\u00NN` equivalents.
///
/// - `\v` becomes `\u000b`
/// - `\xNN` (exactly two hex digits) becomes `\u00NN`, digits copied verbatim
/// - any other escape pair is copied unchanged
///
/// Single forward pass. A recognised escape pair is consumed as a unit, so an
/// escaped backslash (`\\`) never starts a second escape.
pub fn standardize(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 >= bytes.len() {
            i += 1;
            continue;
        }

        match bytes[i + 1] {
            b'v' => {
                out.push_str(&input[copied..i]);
                out.push_str("\\u000b");
                i += 2;
                copied = i;
            }
            b'x' if i + 3 < bytes.len()
                && bytes[i + 2].is_ascii_hexdigit()
                && bytes[i + 3].is_ascii_hexdigit() =>
            {
                out.push_str(&input[copied..i]);
                out.push_str("\\u00");
                out.push_str(&input[i + 2..i + 4]);
                i += 4;
                copied = i;
            }
            // Unknown or already-strict escape: keep the pair together.
            _ => i += 2,
        }
    }

    out.push_str(&input[copied..]);
    out
}

/// Serialize `value` and standardize the result
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let text = serde_json::to_string(value)?;
    Ok(standardize(&text).into_bytes())
}
