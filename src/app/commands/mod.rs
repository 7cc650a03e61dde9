pub mod exec;
pub mod export;
pub mod fix;
pub mod generate;
pub mod solve;
