pub mod board;
pub mod rng;
pub mod score;
