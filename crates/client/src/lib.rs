//! Client code for swcache.
//!
//! This crate provides the network seam and the caching worker itself:
//! lifecycle, request routing and registration.

pub mod fetch;
pub mod worker;

#[cfg(test)]
mod testing;

pub use fetch::{Connectivity, FetchClient, FetchConfig, GatedNetwork, Network};
pub use worker::{
    Classification, ControlMessage, LifecycleManager, Registration, RegistrationEvent, RegistrationStatus,
    RequestRouter, ResponseSource, RoutedResponse, UpdateOutcome, WorkerSettings, WorkerState,
};
