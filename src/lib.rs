//! Resolves Maven artifacts declared by plugins and puts them on the host's search path.
//!
//! Each plugin archive may carry a `dependencies.conf` manifest (see [manifest]). The [scanner]
//! reads the manifests of all archives in the plugin directory and hands their directives to a
//! [loader::DependencyLoader], which resolves artifacts through the local cache and remote
//! repositories ([maven]) and installs them through an [extension::ExtensionLoader].

pub mod config;
pub mod error;
pub mod extension;
pub mod loader;
pub mod manifest;
pub mod maven;
pub mod scanner;
pub mod util;
