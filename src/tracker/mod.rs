pub mod bootstrap;
pub mod tracker;
