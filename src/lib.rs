//! Hearthstead - settlement citizen simulation
//!
//! Agents on a tile grid decide what to do from a priority tree (survival
//! needs, jobs, social life, leisure) and move along A* paths. Everything
//! runs from one discrete clock and one seeded random source, so a run is
//! reproducible from its seed.

pub mod city;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod settlement;
pub mod simulation;
pub mod spatial;
