pub mod audio;
pub mod system;
