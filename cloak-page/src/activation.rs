//! Passphrase extraction from a page-load URL fragment.
//!
//! The passphrase travels in the URL fragment (never sent to the server) as
//! a query-style parameter, e.g. `#p=correct-horse&section=intro`. The
//! bootstrap pulls it out here, then hands the scrubbed fragment back to
//! the embedder to rewrite into browser history before invoking the
//! engine. History rewriting itself stays on the embedder's side.

/// Default name of the passphrase parameter in the fragment.
pub const DEFAULT_PASSWORD_PARAM: &str = "p";

/// A passphrase pulled out of a URL fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activation {
    /// The decoded passphrase.
    pub password: String,
    /// The fragment with the passphrase parameter removed, other
    /// parameters preserved in order and still encoded.
    pub scrubbed_fragment: String,
}

/// Extracts the passphrase parameter `param` from a URL fragment.
///
/// `fragment` is the part after `#`, with or without the leading `#`.
/// Returns `None` when the parameter is absent.
pub fn extract_passphrase(fragment: &str, param: &str) -> Option<Activation> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

    let mut password = None;
    let mut kept = Vec::new();
    for pair in fragment.split('&').filter(|pair| !pair.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if decode_component(name) == param {
            // First value wins; every occurrence is scrubbed
            password.get_or_insert_with(|| decode_component(value));
        } else {
            kept.push(pair);
        }
    }

    Some(Activation {
        password: password?,
        scrubbed_fragment: kept.join("&"),
    })
}

/// Decodes one query component: `+` means space, then percent-decoding.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
