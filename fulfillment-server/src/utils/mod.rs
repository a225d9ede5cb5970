pub mod logger;
pub mod money;
pub mod password;
