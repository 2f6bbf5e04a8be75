//! Configuration types shared by the core controller and its hosts.

mod endpoints;

pub use endpoints::Endpoints;
