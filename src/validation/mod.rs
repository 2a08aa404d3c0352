pub mod check_digit;
pub mod expiry;
pub mod format;
pub mod mrz;

pub use expiry::{DateKind, ExpiryValidator};
pub use format::{FormatMatch, FormatMatcher};
pub use mrz::MrzValidator;
