pub mod arena;
pub mod tree;
pub mod view_model;
