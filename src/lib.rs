pub mod board;
pub mod cards;
pub mod config;
pub mod equity;
pub mod error;
pub mod hand_evaluator;
pub mod hand_tables;
pub mod player;
pub mod snapshot;
pub mod table;
