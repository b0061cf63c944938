// ABOUTME: Deploy key material and ssh-agent utilities for the deploy-key tool.
// ABOUTME: Provides key generation, PEM/OpenSSH encoding, fingerprinting, and agent access.

//! # deploy-key-ssh
//!
//! Everything the `deploy-key` CLI needs to produce and retire an SSH key pair
//! for a single repository.
//!
//! ## Features
//!
//! - **Key generation**: the [`KeyGenerator`] trait, with an in-process ed25519
//!   implementation ([`Ed25519Generator`]) and one that shells out to
//!   `ssh-keygen` ([`SshKeygenGenerator`])
//! - **Encoding**: PKCS#8 `PRIVATE KEY` PEM and `ssh-ed25519` public key lines
//! - **Fingerprinting**: `SHA256:` fingerprints identical to OpenSSH's
//! - **Agent access**: the [`KeyAgent`] trait and the `ssh-add` backed [`SshAgentCli`]
//!
//! ## Example
//!
//! ```no_run
//! use deploy_key_ssh::{Ed25519Generator, KeyGenerator, KeyRequest};
//!
//! let request = KeyRequest::new("/home/me/.ssh/website_deploy-key", "me@example.com");
//! let key = Ed25519Generator.generate(&request).expect("key should generate");
//! print!("{}", key.public_key_line);
//! ```

mod agent;
mod encode;
mod error;
mod fingerprint;
mod key;

pub use agent::{
    auth_socket, find_listed_key, parse_fingerprint_output, KeyAgent, SshAgentCli, AUTH_SOCK_ENV,
};
pub use encode::{
    encode_private_key_pem, format_public_key_line, parse_public_key_line, public_key_blob,
    ED25519_ALGORITHM,
};
pub use error::{Result, SshError};
pub use fingerprint::{compute_fingerprint, fingerprint_public_key_file};
pub use key::{
    ensure_key_dir, public_key_path, write_key_file, Ed25519Generator, GeneratedKey,
    KeyGenerator, KeyRequest, SshKeygenGenerator, KEY_FILE_SUFFIX, PRIVATE_KEY_MODE,
    PUBLIC_KEY_MODE,
};

// Re-export ssh_key types for convenience
pub use ssh_key::PublicKey;
