pub mod deployment_configuration;
