//! # qchip Core
//!
//! Geometry engine and component host for superconducting-qubit chip layout:
//! `geo`-backed shape construction, a rotate-then-translate placement
//! pipeline, option tables with unit and design-variable resolution, geometry
//! tables, pins, and the [`Design`] that runs [`Component`] build passes.

pub mod component;
pub mod design;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod options;
pub mod pin;
pub mod qgeometry;
pub mod spatial;
pub mod transform;
pub mod units;

pub use component::{Component, ComponentGeometry, ComponentId, ComponentMetadata, MakeContext};
pub use design::{Design, RenderMode};
pub use error::{CoreError, Result};
pub use geometry::{BBox, Point, Shape};
pub use layer::{Layer, LayerId, LayerStack};
pub use options::{OptionValue, Options};
pub use pin::Pin;
pub use qgeometry::{QGeometry, QGeometryTables, TableKind};
pub use transform::Transform;
pub use units::Variables;
