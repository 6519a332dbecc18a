pub mod deployment_overrides;
pub mod effective;
pub mod init_container;
pub mod key_ref;
pub mod platform_defaults;
pub mod policy;
pub mod probe;
pub mod resources;
pub mod security_context;
pub mod stateful_set;
pub mod toleration;
