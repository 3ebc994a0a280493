//! Descriptor store.
//!
//! Reads declarative component metadata from the filesystem. Nothing here
//! knows about activation; resolution consumes the parsed descriptors.

pub mod element;
pub mod manifest;
pub mod store;
pub mod version;
