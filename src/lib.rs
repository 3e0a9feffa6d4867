//! Generic n-dimensional image storage with uniform accessors.
//!
//! Containers (`img`) hold elements in a flat buffer under one of several layouts. They are read
//! and written through small capability traits (`space`): cursors walk every element in the
//! container's iteration order, random accesses can be positioned anywhere. An `OutOfBounds`
//! wrapper (`outofbounds`) makes a bounded random access readable over all of ℤⁿ, and `Round`
//! (`transform`) drives an integer accessor from real valued positions.
//!
//! Algorithms (`algorithm`) combine these pieces and run over disjoint chunks of their output in
//! parallel (`multithreading`).

pub mod algorithm;
pub mod config;
mod errors;
pub mod img;
pub mod multithreading;
pub mod outofbounds;
pub mod space;
pub mod transform;
pub mod types;

pub use errors::ImgError;

pub type Result<T> = std::result::Result<T, ImgError>;
