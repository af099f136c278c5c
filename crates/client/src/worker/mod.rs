//! The offline caching worker.
//!
//! - [`lifecycle`]: install, activate and retire one generation
//! - [`router`]: classify intercepted requests and apply a caching strategy
//! - [`registration`]: generation slots, update flow and host notifications

pub mod lifecycle;
pub mod registration;
pub mod router;

pub use lifecycle::{ActivationReport, GenerationId, LifecycleManager, WorkerState};
pub use registration::{
    ControlMessage, Generation, GenerationStatus, Registration, RegistrationEvent, RegistrationStatus, UpdateOutcome,
    WorkerSettings,
};
pub use router::{Classification, FetchOutcome, RequestRouter, ResponseSource, RoutePolicy, RoutedResponse};
