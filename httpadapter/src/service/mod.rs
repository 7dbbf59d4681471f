pub mod fs;
pub mod transfer;
