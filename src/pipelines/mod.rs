//! Render pipeline definitions.
//!
//! - `basic` is the lit, instanced pipeline every mesh and particle goes through
//! - `light` holds the spotlight/ambient uniform and its bind group

pub mod basic;
pub mod light;
