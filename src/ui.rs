pub mod fields;
pub mod input;
pub mod state;
pub mod viewer;
