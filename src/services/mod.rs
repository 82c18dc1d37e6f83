pub mod assignment;
pub mod auth;
pub mod ids;
pub mod lifecycle;
pub mod otp;
pub mod reports;
