pub mod entity;
pub mod grid;
pub mod rng;
pub mod session;
pub mod tile;
