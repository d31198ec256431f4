//! # qchip DRC
//!
//! Design rule checks over the geometry tables of a built design: metal
//! enclosed by its component's cutouts, single-contour metal, non-degenerate
//! rows, and no metal overlap between components on a shared layer.

pub mod checks;
pub mod config;
pub mod error;
pub mod violation;

pub use checks::{DrcEngine, DrcReport};
pub use config::DrcConfig;
pub use error::{DrcError, Result};
pub use violation::{DrcViolation, Severity, ViolationType};
