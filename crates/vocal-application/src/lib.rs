//! Vocal application layer.
//!
//! Hosts the scheduling orchestrator ([`SchedulingUseCase`]) and the
//! session registry boundary ([`SchedulingService`]) that upward
//! transports (HTTP, CLI) drive.

pub mod scheduling_usecase;
pub mod service;

pub use scheduling_usecase::{AdvanceOutcome, SchedulingUseCase, TurnReply};
pub use service::SchedulingService;
