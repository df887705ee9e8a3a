pub mod constants;
pub mod crypto;
pub mod frame;
pub mod mac;

pub use frame::Frame;
pub use mac::{compute_tag, verify_tag};
