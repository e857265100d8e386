//! Per-request unique token for the signed auth-data line

use rand::RngCore;

const NONCE_BYTES: usize = 8;

/// Produce a fresh nonce
///
/// Random bytes from the thread-local CSPRNG rendered as concatenated decimal
/// values, followed by the process id. The result contains digits only.
pub fn next_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let mut nonce: String = bytes.iter().map(|b| b.to_string()).collect();
    nonce.push_str(&std::process::id().to_string());
    nonce
}
