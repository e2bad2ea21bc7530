pub mod init;
pub mod module;
pub mod show;
