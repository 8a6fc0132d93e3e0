// HTTP handlers, one module per route group

pub mod crud;
pub mod proxy;
pub mod session;
pub mod system;
