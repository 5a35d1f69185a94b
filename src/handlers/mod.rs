pub mod fetch;
pub mod index;
