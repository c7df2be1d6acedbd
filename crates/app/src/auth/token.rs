//! Bearer token formatting, parsing, and verifier construction.
//!
//! Tokens look like `bz_v1_{session uuid}.{secret hex}`. The session uuid is public and
//! selects the stored session; the secret is only ever checked against its SHA-256 verifier.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::auth::records::{SessionUuid, UserUuid};

/// Bearer token identifier prefix.
pub const SESSION_TOKEN_PREFIX: &str = "bz";

/// Number of secret bytes encoded in a token.
pub const SESSION_TOKEN_SECRET_BYTES: usize = 32;

const SESSION_TOKEN_SECRET_HEX_CHARS: usize = SESSION_TOKEN_SECRET_BYTES * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTokenVersion {
    V1,
}

impl SessionTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for SessionTokenVersion {
    type Error = SessionTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(SessionTokenError::UnsupportedVersion),
        }
    }
}

impl FromStr for SessionTokenVersion {
    type Err = SessionTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(SessionTokenError::UnsupportedVersion),
        }
    }
}

#[derive(Clone)]
pub struct SessionTokenSecret {
    bytes: [u8; SESSION_TOKEN_SECRET_BYTES],
}

impl SessionTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SESSION_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SESSION_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for SessionTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionTokenSecret(**redacted**)")
    }
}

impl Drop for SessionTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedSessionToken {
    pub session: SessionUuid,
    pub version: SessionTokenVersion,
    pub secret: SessionTokenSecret,
}

#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("session token format is invalid")]
    InvalidFormat,

    #[error("session token uses an unsupported version")]
    UnsupportedVersion,

    #[error("session token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_session_secret() -> SessionTokenSecret {
    let mut secret = [0_u8; SESSION_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    SessionTokenSecret::from_bytes(secret)
}

#[must_use]
pub fn format_session_token(
    session: SessionUuid,
    version: SessionTokenVersion,
    secret: &SessionTokenSecret,
) -> String {
    format!(
        "{SESSION_TOKEN_PREFIX}_{}_{}.{}",
        version.segment(),
        session.into_uuid().simple(),
        encode_secret_hex(secret.as_bytes())
    )
}

pub fn parse_session_token(token: &str) -> Result<ParsedSessionToken, SessionTokenError> {
    let (prefix_and_id, secret_hex) = token
        .split_once('.')
        .ok_or(SessionTokenError::InvalidFormat)?;

    let mut id_parts = prefix_and_id.splitn(3, '_');

    let prefix = id_parts.next().ok_or(SessionTokenError::InvalidFormat)?;
    let version_segment = id_parts.next().ok_or(SessionTokenError::InvalidFormat)?;
    let session_segment = id_parts.next().ok_or(SessionTokenError::InvalidFormat)?;

    if prefix != SESSION_TOKEN_PREFIX {
        return Err(SessionTokenError::InvalidFormat);
    }

    let version = SessionTokenVersion::from_str(version_segment)?;

    let session = Uuid::try_parse(session_segment)
        .ok()
        .ok_or(SessionTokenError::InvalidFormat)?;

    let secret = decode_secret_hex(secret_hex).ok_or(SessionTokenError::InvalidSecretEncoding)?;

    Ok(ParsedSessionToken {
        session: SessionUuid::from_uuid(session),
        version,
        secret: SessionTokenSecret::from_bytes(secret),
    })
}

/// SHA-256 verifier stored in place of the token secret, hex encoded.
///
/// Input: `{session_uuid_hex}:{version_i16_decimal}:{user_uuid_hex}:{secret_hex}`. Binding the
/// session, version and user means a stored verifier cannot be replayed for another session.
#[must_use]
pub fn session_verifier(
    session: SessionUuid,
    version: SessionTokenVersion,
    user: UserUuid,
    secret: &SessionTokenSecret,
) -> String {
    let mut input = format!(
        "{}:{}:{}:{}",
        session.into_uuid().simple(),
        version.as_i16(),
        user.into_uuid().simple(),
        encode_secret_hex(secret.as_bytes()),
    );

    let digest = Sha256::digest(input.as_bytes());

    input.zeroize();

    format!("{digest:x}")
}

fn encode_secret_hex(secret: &[u8; SESSION_TOKEN_SECRET_BYTES]) -> String {
    let mut encoded = String::with_capacity(SESSION_TOKEN_SECRET_HEX_CHARS);

    for byte in secret {
        encoded.push(hex_digit(byte >> 4));
        encoded.push(hex_digit(byte & 0x0f));
    }

    encoded
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16).unwrap_or('0')
}

fn decode_secret_hex(secret_hex: &str) -> Option<[u8; SESSION_TOKEN_SECRET_BYTES]> {
    if secret_hex.len() != SESSION_TOKEN_SECRET_HEX_CHARS {
        return None;
    }

    let mut secret = [0_u8; SESSION_TOKEN_SECRET_BYTES];

    for (byte, pair) in secret.iter_mut().zip(secret_hex.as_bytes().chunks_exact(2)) {
        let [hi, lo] = pair else {
            return None;
        };

        *byte = (decode_hex_nibble(*hi)? << 4) | decode_hex_nibble(*lo)?;
    }

    Some(secret)
}

fn decode_hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}
