pub mod requests;
pub mod world;
