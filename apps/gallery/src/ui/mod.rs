pub mod pagination;
pub mod render;
