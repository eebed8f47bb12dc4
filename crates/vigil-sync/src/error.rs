//! Fetch failures, normalized at the client boundary.

use thiserror::Error;

pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// Why a fetch attempt failed.
///
/// The sync engine never branches on the variant; it only distinguishes
/// failures before and after the first successful load. The variants
/// exist so logs and tests can tell transport faults from protocol and
/// decode faults.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The request never produced an HTTP response (connect, DNS, timeout).
  #[error("request failed: {0}")]
  Transport(#[source] reqwest::Error),

  /// The backend answered with a non-success status.
  #[error("server returned {0}")]
  Status(reqwest::StatusCode),

  /// A body arrived but was not the expected envelope.
  #[error("malformed response body: {0}")]
  Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::Decode(err)
    } else {
      Self::Transport(err)
    }
  }
}
