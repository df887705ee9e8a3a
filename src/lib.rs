//! Re-exports the [`vispr`] library for convenient access to the broadcast protocol types.
pub use vispr;
