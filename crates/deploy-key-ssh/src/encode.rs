// ABOUTME: Encoders for ed25519 deploy key files.
// ABOUTME: PKCS#8 PEM private keys and single-line OpenSSH public keys.

use crate::error::{Result, SshError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ssh_key::PublicKey;

/// Algorithm name used in the public key line and the wire blob.
pub const ED25519_ALGORITHM: &str = "ssh-ed25519";

/// PEM label for unencrypted PKCS#8 private keys.
const PEM_LABEL: &str = "PRIVATE KEY";

/// Columns per base64 line inside a PEM body.
const PEM_LINE_WIDTH: usize = 64;

/// Fixed PKCS#8 envelope preceding the 32-byte ed25519 seed (RFC 8410):
///
/// - `30 2e`: SEQUENCE, 46 bytes
/// - `02 01 00`: INTEGER version 0
/// - `30 05 06 03 2b 65 70`: AlgorithmIdentifier, OID 1.3.101.112
/// - `04 22 04 20`: OCTET STRING wrapping a 32-byte OCTET STRING
const PKCS8_ED25519_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Encode an ed25519 seed as a PEM `PRIVATE KEY` block with a trailing newline.
pub fn encode_private_key_pem(seed: &[u8; 32]) -> String {
    let mut der = Vec::with_capacity(PKCS8_ED25519_PREFIX.len() + seed.len());
    der.extend_from_slice(&PKCS8_ED25519_PREFIX);
    der.extend_from_slice(seed);

    let body = STANDARD.encode(&der);

    let mut pem = format!("-----BEGIN {PEM_LABEL}-----\n");
    for (i, c) in body.chars().enumerate() {
        if i > 0 && i % PEM_LINE_WIDTH == 0 {
            pem.push('\n');
        }
        pem.push(c);
    }
    pem.push('\n');
    pem.push_str(&format!("-----END {PEM_LABEL}-----\n"));
    pem
}

/// Build the SSH wire blob for an ed25519 public key:
/// string "ssh-ed25519" followed by string <32 key bytes>, each with a
/// 4-byte big-endian length prefix.
pub fn public_key_blob(public_key: &[u8; 32]) -> Vec<u8> {
    let algo_bytes = ED25519_ALGORITHM.as_bytes();

    let mut wire_data = Vec::with_capacity(8 + algo_bytes.len() + public_key.len());
    wire_data.extend_from_slice(&(algo_bytes.len() as u32).to_be_bytes());
    wire_data.extend_from_slice(algo_bytes);
    wire_data.extend_from_slice(&(public_key.len() as u32).to_be_bytes());
    wire_data.extend_from_slice(public_key);
    wire_data
}

/// Format `ssh-ed25519 <base64> <comment>` with a trailing newline.
///
/// An empty comment is dropped entirely, leaving no trailing space.
pub fn format_public_key_line(public_key: &[u8; 32], comment: &str) -> String {
    let encoded = STANDARD.encode(public_key_blob(public_key));
    let comment = comment.trim();
    if comment.is_empty() {
        format!("{ED25519_ALGORITHM} {encoded}\n")
    } else {
        format!("{ED25519_ALGORITHM} {encoded} {comment}\n")
    }
}

/// Parse a single authorized-key style line back into a public key.
///
/// # Errors
/// Returns `SshError::ParsePublicKey` if the line is not valid OpenSSH format.
pub fn parse_public_key_line(line: &str) -> Result<PublicKey> {
    PublicKey::from_openssh(line.trim()).map_err(SshError::ParsePublicKey)
}
