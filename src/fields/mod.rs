pub mod identify;
pub mod patterns;
pub mod role;
