//! Rendezvous point: the registry, its remote-call service and the client
//! peers use to reach it.

pub mod client;
pub mod registry;
pub mod service;

pub use client::RendezvousClient;
pub use registry::{Registry, RegistrySnapshot};
pub use service::RendezvousService;
