//! Render pipeline construction shared by every shader program.

pub mod basic;
