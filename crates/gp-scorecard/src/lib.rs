//! Business rules for scoring live-game presenters.
//!
//! Uploaded rows are validated and cross-checked in [`workflows::intake`], matched to
//! canonical presenter names in [`workflows::roster`], scored in [`workflows::bonus`],
//! and rolled up once a month per team by [`workflows::reports`].

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
