//! Component registry and activation contracts.
//!
//! A component is a folder with a `component.json` descriptor. Resolution
//! loads each identifier at most once, requirements first, and binds it to a
//! typed implementation taken from the [`catalog::ImplementationCatalog`].

pub mod behavior;
pub mod catalog;
pub mod context;
pub mod folder_index;
pub mod instance;
pub mod resolver;
