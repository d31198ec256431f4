//! # qchip QLibrary
//!
//! Parametric components for superconducting-qubit chips: a circular
//! transmon with claw readout couplers and a tapered wire-bond launch tip.
//! Both implement [`qchip_core::Component`] and are added to a
//! [`qchip_core::Design`] by value.

pub mod claw_transmon;
pub mod launch_tip;

pub use claw_transmon::{BodyParams, ClawGeometry, ClawParams, ClawTransmon};
pub use launch_tip::{LaunchTip, LaunchTipGeometry, LaunchTipParams};
