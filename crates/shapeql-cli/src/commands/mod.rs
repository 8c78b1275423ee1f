pub mod compile;
pub mod fragments;
pub mod helpers;
pub mod usage;
pub mod variables;
