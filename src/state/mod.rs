pub mod actions;
pub mod signature;
pub mod state_model;

