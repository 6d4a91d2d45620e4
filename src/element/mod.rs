pub mod attr;
pub mod element_tree;
pub mod xpath;
