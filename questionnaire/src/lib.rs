//! # questionnaire
//!
//! Drive a respondent through a questionnaire script. Transport-agnostic.
//!
//! A [`Questionnaire`] loads a [`Script`] from a [`ScriptProvider`], restores
//! any earlier answers, walks the respondent through the visible steps with
//! per-step validation, and hands the answers to a [`SubmissionSink`] once.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use questionnaire::{IdentitySnapshot, Questionnaire};
//!
//! let mut flow = Questionnaire::new(session_id, IdentitySnapshot::anonymous());
//! flow.load(&backend).await?;
//!
//! flow.set_answer("context", "I run a bakery")?;
//! flow.next()?;
//! flow.set_answer("willing_to_pay", 4)?;
//!
//! let receipt = flow.submit(&backend).await?;
//! ```
//!
//! ## Step kinds
//!
//! - `info` - Copy only, acknowledged with next
//! - `free_text` / `email` / `confirm` - One answer at the step key
//! - `scale` / `scale_with_preamble` - An integer within inclusive bounds
//! - `single_choice` - One of the step's options
//! - `external_account_link` / `identity_gate` - A skippable wallet link
//! - `composite_problem` - Score, reason and attempts, answered together
//! - `multi_rate_block` - Optional ratings on a shared scale
//!
//! ## Collaborators
//!
//! Scripts, identity, wallets and submission are traits. The
//! `questionnaire-http` crate talks to the backend; [`testing`] has
//! in-memory versions.

// Re-export all types from questionnaire-types
pub use questionnaire_types::*;

pub mod resume;
pub mod respondent;
pub mod submission;
pub mod validation;
pub mod visibility;

mod engine;
pub use engine::{
    FlowError, FlowState, LoadTicket, Progress, Questionnaire, Settled, Started, SubmitTicket,
};

pub use validation::ValidationError;

// In-memory collaborators for tests and demos
pub mod testing;
