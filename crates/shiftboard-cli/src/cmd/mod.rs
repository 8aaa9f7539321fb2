pub mod init;
pub mod log;
pub mod publish;
pub mod serve;
pub mod shift;
pub mod status;
