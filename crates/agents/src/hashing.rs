use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// Digest text before it touches the interaction log. With a secret
/// configured the digest is keyed, so log entries cannot be matched against
/// hashes computed elsewhere; without one it is a plain SHA-256.
pub fn hash_for_logging(text: &str, secret: Option<&str>) -> String {
    match secret.filter(|value| !value.trim().is_empty()) {
        Some(secret) => match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
            Ok(mut mac) => {
                mac.update(text.as_bytes());
                hex_encode(mac.finalize().into_bytes().as_slice())
            }
            Err(_) => hex_encode(Sha256::digest(text.as_bytes()).as_slice()),
        },
        None => hex_encode(Sha256::digest(text.as_bytes()).as_slice()),
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(format!("{:02x}", byte).as_str());
    }
    out
}
