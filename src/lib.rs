#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod catalog;
pub mod client;
pub mod envelope;
pub mod error;
pub mod faults;
pub mod filter;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use catalog::{CodeAuthority, ErrorCode, ErrorRecord, render};
pub use client::config::ClientConfig;
pub use client::contact::{
    CallConfirmation, ContactConfirmation, LaunchReference, clean_contact_data, is_email_shaped,
};
pub use client::{MessageFocusClient, Transport};
pub use envelope::{Envelope, interpret_reply};
pub use error::Error;
pub use faults::{Classification, FaultPattern, FaultTranslator};
pub use filter::{FilterMask, TABLE_FILTER, filter_results};
pub use types::{AdditionalInformation, Fault, RemoteFailure};
