pub mod files;
pub mod system;
