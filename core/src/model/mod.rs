pub mod entry;
pub mod formulation;
