//! Extension registry contracts.
//!
//! Components declare extension points by namespace and contribute typed
//! extensions to each other through descriptor fragments, without any
//! compile-time coupling between contributor and consumer.

pub mod point;
pub mod registry;
