//! Client core for the mouza survey form: location lookups, the dependent
//! division → district → upazila cascade, the repeatable mouza list, and
//! submission of the assembled payload.

pub mod cascade;
pub mod config;
pub mod directory;
pub mod error;
pub mod mouza;
pub mod runtime;
pub mod screen;
pub mod submission;

pub use cascade::{CascadeController, LookupOutcome, LookupRequest};
pub use directory::{HttpLocationDirectory, LocationDirectory};
pub use error::{DirectoryError, FormError, SubmitError};
pub use mouza::{MouzaField, MouzaListController};
pub use runtime::{FormHandle, FormRuntime, RuntimeStopped};
pub use screen::{
    FormEffect, FormEvent, FormScreen, FormView, Notice, NoticeKind, SubmissionStatus,
};
pub use submission::{
    build_payload, HttpSubmissionClient, SubmissionAssembler, SubmissionEndpoint,
    SubmissionReceipt,
};
