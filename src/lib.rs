//! Reading and writing game histories in the concise grid notation.
pub mod board;
pub mod concise;
