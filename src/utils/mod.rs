pub mod log_notifier;
pub mod session_auth;
pub mod subscription_registry;
