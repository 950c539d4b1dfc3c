//! Layout and persistence format definitions
//!
//! Pure data structure definitions: orientation, index arithmetic, and the
//! closed set of persistence tags. No I/O, no concrete storage.

pub mod layout;
pub mod tag;

pub use layout::{Layout, Orientation};
pub use tag::StoreTag;
