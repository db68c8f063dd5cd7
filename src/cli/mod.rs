pub mod catalog;
pub mod docs;
pub mod fix;
pub mod init;
pub mod sync;
pub mod validate;
