//! Primitive value types shared by ORDB node attributes: exact rational
//! numbers and the D4/TD4 affine-transform algebra used for placement and
//! orientation.

pub mod entity;
pub mod geoprim;
pub mod rational;

pub use entity::EntityRef;
pub use geoprim::{Rect4R, Vec2R, D4, TD4};
pub use rational::Rational;
