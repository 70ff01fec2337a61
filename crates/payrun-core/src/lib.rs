//! # Payrun Core
//!
//! The orchestration core for payrun: a small interpreter over a flat,
//! ordered list of commands with a string-keyed output memory.
//!
//! * [`store::OutputStore`] - insertion-ordered, last-write-wins record of
//!   command outputs, addressed by `"{command}_{field}"` keys.
//! * [`resolver`] - all-or-nothing substitution of `$command.field`
//!   parameter references against the store.
//! * [`descriptor`] - one static descriptor per command kind (wire shape,
//!   payload builder, output-field map) replacing per-kind handlers.
//! * [`runner::CommandRunner`] - strictly sequential execution: resolve,
//!   authenticate, dispatch, extract, record; failures are recorded and the
//!   run continues.
//! * [`provision::Provisioner`] - the setup pipeline over the same seams.
//!
//! Both external services are reached through the [`gateway`] traits, so the
//! core carries no HTTP code and is testable with plain mocks.

pub mod analysis;
pub mod descriptor;
pub mod gateway;
pub mod provision;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod store;

mod error;

pub use analysis::{analyze_references, ReferenceAnalysis};
pub use descriptor::{descriptor_for, CommandDescriptor, OutputField, ResolvedParams, Wire};
pub use error::CoreError;
pub use gateway::{AccessToken, AuthGateway, PaymentsGateway, RequestPayload, RestMethod, TokenScope};
pub use provision::Provisioner;
pub use report::{CommandOutcome, ExecutionReport};
pub use resolver::{resolve, Resolution};
pub use runner::CommandRunner;
pub use store::OutputStore;
