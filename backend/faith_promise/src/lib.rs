//! Faith promise pledge form.
//!
//! The form core lives in [`store`], [`validator`], [`currency`] and
//! [`controller`]; [`sink`], [`db`] and [`webhook`] record completed pledges,
//! [`api`] serves the recorded ledger and [`console`] is a line-based
//! front-end over the controller.

pub mod api;
pub mod config;
pub mod console;
pub mod controller;
pub mod currency;
pub mod db;
pub mod errors;
pub mod form;
pub mod shutdown;
pub mod sink;
pub mod store;
pub mod validator;
pub mod webhook;

pub use controller::{Phase, SubmissionController, SubmitOutcome};
pub use errors::{AppError, SubmissionError};
pub use form::{Field, FileRef, FormData, PaymentMethod, PledgeRecord};
pub use validator::ErrorMap;
