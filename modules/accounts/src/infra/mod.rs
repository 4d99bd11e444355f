pub mod crypto;
pub mod session;
pub mod storage;
