pub mod grade;
pub mod init;
pub mod play;
pub mod stats;
pub mod tiers;
pub mod validate;
