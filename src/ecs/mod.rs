//! Entity storage and the world context

pub mod store;
pub mod world;

pub use store::{Component, ComponentStore};
pub use world::World;
