pub mod services;
pub mod session;
