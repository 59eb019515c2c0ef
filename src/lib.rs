//! Correlates page interactions (contact-form submissions, CTA clicks, video
//! plays) with the sender/contact identity in the page URL and reports them.
//!
//! Page markup is modelled as a [`dom::document::Document`] arena; the
//! browser-facing pieces (navigation, remote endpoints) sit behind the
//! [`flow::redirect::Navigator`] and [`remote::api::TrackerApi`] traits.

pub mod cli;
pub mod contact;
pub mod dom;
pub mod error;
pub mod fields;
pub mod flow;
pub mod page;
pub mod remote;
pub mod testing;
pub mod trace;
pub mod tracker;
pub mod video;

pub use error::{Result, TrackerError};
pub use tracker::tracker::Tracker;
