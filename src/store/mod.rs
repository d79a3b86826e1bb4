pub mod attendance;
pub mod employees;
pub mod tokens;
