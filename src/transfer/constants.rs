//! Constants for the transfer module (timeouts).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout between body reads (15 minutes).
///
/// The service renders the whole document before the first byte arrives,
/// which can take several minutes for large manuscripts.
pub const READ_TIMEOUT_SECS: u64 = 900;
