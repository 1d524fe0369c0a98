//! Domain types shared by the Edutech provisioning tools.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers freely; adapters convert their
//! wire rows into these types at the boundary.

pub mod id;
pub mod pagination;
pub mod role;
