//! Alien invasion simulation core.
//!
//! A named city graph with four-way borders, aliens that wander it at
//! random, and an engine that resolves collisions by destroying the
//! contested city along with both aliens.

pub mod alien;
pub mod cancel;
pub mod city;
pub mod city_map;
pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod event;
pub mod map_format;
pub mod map_gen;
pub mod rng;
pub mod snapshot;
pub mod types;
