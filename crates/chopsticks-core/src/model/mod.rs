pub mod hand;
pub mod moves;
pub mod player;
pub mod rules;
