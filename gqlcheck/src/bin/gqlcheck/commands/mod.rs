pub mod diff;
pub mod init;
