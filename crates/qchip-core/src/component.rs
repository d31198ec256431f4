//! The component capability interface and its build context.
//!
//! A component is a pure geometry generator: given resolved options it
//! registers named shapes and pins through a [`MakeContext`]. The host
//! ([`crate::Design`]) owns the context and commits the result.

use std::fmt;

use geo::LineString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::design::RenderMode;
use crate::error::{CoreError, Result};
use crate::geometry::Shape;
use crate::layer::{LayerId, LayerStack};
use crate::options::Options;
use crate::pin::Pin;
use crate::qgeometry::{QGeometry, TableKind};
use crate::units::Variables;

/// Unique component identifier.
pub type ComponentId = Uuid;

/// Chip used when a component's options do not name one.
pub const DEFAULT_CHIP: &str = "main";

/// Static description of a component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub short_name: String,
    /// Geometry tables the component writes to.
    pub tables: Vec<TableKind>,
    pub tooltip: String,
}

impl ComponentMetadata {
    pub fn new(short_name: &str, tables: &[TableKind]) -> Self {
        Self {
            short_name: short_name.to_string(),
            tables: tables.to_vec(),
            tooltip: String::new(),
        }
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    pub fn declares(&self, table: TableKind) -> bool {
        self.tables.contains(&table)
    }
}

/// A parametric geometry generator.
pub trait Component: fmt::Debug + Send + Sync {
    fn metadata(&self) -> ComponentMetadata;

    /// Default option table. User overrides are merged on top of it.
    fn default_options(&self) -> Options;

    /// Build all geometry and pins for the options in `ctx`.
    fn make(&self, ctx: &mut MakeContext<'_>) -> Result<()>;
}

/// Everything one build pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentGeometry {
    pub rows: Vec<QGeometry>,
    pub pins: Vec<Pin>,
}

impl ComponentGeometry {
    pub fn row(&self, name: &str) -> Option<&QGeometry> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }
}

/// Read access to the design state a build pass may depend on.
#[derive(Debug, Clone, Copy)]
pub struct DesignContext<'a> {
    pub variables: &'a Variables,
    pub layers: &'a LayerStack,
    pub render_mode: RenderMode,
}

/// Build context handed to [`Component::make`].
pub struct MakeContext<'a> {
    id: ComponentId,
    name: &'a str,
    metadata: ComponentMetadata,
    options: &'a Options,
    design: DesignContext<'a>,
    chip: String,
    output: ComponentGeometry,
}

impl<'a> MakeContext<'a> {
    pub fn new(
        id: ComponentId,
        name: &'a str,
        metadata: ComponentMetadata,
        options: &'a Options,
        design: DesignContext<'a>,
    ) -> Result<Self> {
        let chip = match options.get("chip") {
            Some(_) => options.text("chip")?.to_string(),
            None => DEFAULT_CHIP.to_string(),
        };
        Ok(Self {
            id,
            name,
            metadata,
            options,
            design,
            chip,
            output: ComponentGeometry::default(),
        })
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    pub fn variables(&self) -> &Variables {
        self.design.variables
    }

    pub fn render_mode(&self) -> RenderMode {
        self.design.render_mode
    }

    pub fn chip(&self) -> &str {
        &self.chip
    }

    pub fn length(&self, key: &str) -> Result<f64> {
        self.options.length(key, self.design.variables)
    }

    pub fn angle(&self, key: &str) -> Result<f64> {
        self.options.angle(key)
    }

    pub fn flag(&self, key: &str) -> Result<bool> {
        self.options.flag(key)
    }

    /// A layer id that must exist in the design's layer stack.
    pub fn layer(&self, key: &str) -> Result<LayerId> {
        let layer = self.options.layer(key)?;
        if !self.design.layers.contains(layer) {
            return Err(CoreError::invalid_option(
                key,
                layer.to_string(),
                "layer is not in the design's layer stack",
            ));
        }
        Ok(layer)
    }

    pub fn connection_pads(&self) -> Result<Vec<(String, Options)>> {
        self.options.connection_pads()
    }

    /// Register named shapes in a geometry table.
    pub fn add_qgeometry<I, S>(
        &mut self,
        kind: TableKind,
        shapes: I,
        layer: LayerId,
        subtract: bool,
        width: f64,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (S, Shape)>,
        S: Into<String>,
    {
        if !self.metadata.declares(kind) {
            return Err(CoreError::UndeclaredTable {
                component: self.name.to_string(),
                table: kind,
            });
        }
        for (name, shape) in shapes {
            let name = name.into();
            if !kind.accepts(&shape) {
                return Err(CoreError::KindMismatch { name, table: kind });
            }
            if shape.is_empty() {
                return Err(CoreError::degenerate(name, "shape is empty"));
            }
            if subtract && !self.cuts_ground_plane(layer) {
                return Err(CoreError::NoGroundPlane { name, layer });
            }
            log::debug!(
                "{}: {} row '{}' on layer {} (subtract={})",
                self.name,
                kind,
                name,
                layer,
                subtract
            );
            self.output.rows.push(QGeometry {
                component: self.id,
                name,
                kind,
                shape,
                layer,
                subtract,
                width,
                chip: self.chip.clone(),
            });
        }
        Ok(())
    }

    fn cuts_ground_plane(&self, layer: LayerId) -> bool {
        self.design
            .layers
            .get_layer(layer)
            .is_some_and(|l| l.ground_plane)
    }

    pub fn add_pin(&mut self, name: &str, line: &LineString<f64>, width: f64) -> Result<()> {
        let pin = Pin::from_line(name, self.id, line, width, &self.chip)?;
        self.output.pins.push(pin);
        Ok(())
    }

    /// Add a pin from a placed shape, which must be a line.
    pub fn add_pin_shape(&mut self, name: &str, shape: &Shape, width: f64) -> Result<()> {
        let line = shape
            .as_line()
            .ok_or_else(|| CoreError::PinNotLine(name.to_string()))?;
        self.add_pin(name, line, width)
    }

    pub fn finish(self) -> ComponentGeometry {
        self.output
    }
}

/// Run one build pass of `component` with the given options merged over its
/// defaults, outside of any design.
pub fn build(
    component: &dyn Component,
    id: ComponentId,
    name: &str,
    overrides: &Options,
    design: DesignContext<'_>,
) -> Result<ComponentGeometry> {
    let options = component.default_options().merged(overrides);
    let mut ctx = MakeContext::new(id, name, component.metadata(), &options, design)?;
    component.make(&mut ctx)?;
    Ok(ctx.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw;
    use crate::geometry::Point;

    /// A square pad with a pin on its right edge.
    #[derive(Debug)]
    struct SquarePad;

    impl Component for SquarePad {
        fn metadata(&self) -> ComponentMetadata {
            ComponentMetadata::new("Pad", &[TableKind::Poly])
        }

        fn default_options(&self) -> Options {
            Options::new().with("size", "100um").with("layer", "1")
        }

        fn make(&self, ctx: &mut MakeContext<'_>) -> Result<()> {
            let size = ctx.length("size")?;
            let layer = ctx.layer("layer")?;
            let pad = draw::rectangle(size, size, Point::new(0.0, 0.0));
            ctx.add_qgeometry(TableKind::Poly, [("pad", Shape::Poly(pad))], layer, false, 0.0)?;
            let edge = draw::line(&[
                Point::new(size / 2.0, size / 2.0),
                Point::new(size / 2.0, -size / 2.0),
            ]);
            ctx.add_pin("east", &edge, size)
        }
    }

    fn design_context<'a>(vars: &'a Variables, layers: &'a LayerStack) -> DesignContext<'a> {
        DesignContext {
            variables: vars,
            layers,
            render_mode: RenderMode::Layout,
        }
    }

    #[test]
    fn test_build_outside_design() {
        let vars = Variables::with_defaults();
        let layers = LayerStack::with_defaults();
        let out = build(
            &SquarePad,
            Uuid::nil(),
            "pad0",
            &Options::new().with("size", "cpw_width"),
            design_context(&vars, &layers),
        )
        .unwrap();
        assert_eq!(out.rows.len(), 1);
        assert!((out.row("pad").unwrap().shape.area() - 1e-4).abs() < 1e-12);
        assert_eq!(out.pin("east").unwrap().chip, DEFAULT_CHIP);
    }

    #[test]
    fn test_undeclared_table_and_kind_mismatch() {
        let vars = Variables::new();
        let layers = LayerStack::with_defaults();
        let options = Options::new();
        let meta = ComponentMetadata::new("Pad", &[TableKind::Poly]);
        let mut ctx =
            MakeContext::new(Uuid::nil(), "pad0", meta, &options, design_context(&vars, &layers))
                .unwrap();
        let line = Shape::Line(draw::line(&[Point::new(0.0, 0.0), Point::new(0.0, 1.0)]));
        assert!(matches!(
            ctx.add_qgeometry(TableKind::Junction, [("jj", line.clone())], 1, false, 0.01),
            Err(CoreError::UndeclaredTable { .. })
        ));
        assert!(matches!(
            ctx.add_qgeometry(TableKind::Poly, [("jj", line)], 1, false, 0.0),
            Err(CoreError::KindMismatch { .. })
        ));
        assert!(ctx.finish().rows.is_empty());
    }

    #[test]
    fn test_unknown_layer_rejected() {
        let vars = Variables::new();
        let layers = LayerStack::with_defaults();
        let err = build(
            &SquarePad,
            Uuid::nil(),
            "pad0",
            &Options::new().with("layer", "9"),
            design_context(&vars, &layers),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidOption { key, .. } if key == "layer"));
    }

    #[test]
    fn test_subtract_requires_ground_plane() {
        let vars = Variables::new();
        let layers = LayerStack::with_defaults();
        let options = Options::new();
        let meta = ComponentMetadata::new("Pad", &[TableKind::Poly]);
        let mut ctx =
            MakeContext::new(Uuid::nil(), "pad0", meta, &options, design_context(&vars, &layers))
                .unwrap();
        let pocket = Shape::Poly(draw::rectangle(0.1, 0.1, Point::new(0.0, 0.0)));
        let err = ctx
            .add_qgeometry(TableKind::Poly, [("pocket", pocket.clone())], 2, true, 0.0)
            .unwrap_err();
        assert!(matches!(err, CoreError::NoGroundPlane { layer: 2, .. }));
        ctx.add_qgeometry(TableKind::Poly, [("island", pocket.clone())], 2, false, 0.0)
            .unwrap();
        ctx.add_qgeometry(TableKind::Poly, [("pocket", pocket)], 1, true, 0.0)
            .unwrap();
        assert_eq!(ctx.finish().rows.len(), 2);
    }

    #[test]
    fn test_pin_from_shape_must_be_line() {
        let vars = Variables::new();
        let layers = LayerStack::with_defaults();
        let options = Options::new();
        let meta = ComponentMetadata::new("Pad", &[TableKind::Poly]);
        let mut ctx =
            MakeContext::new(Uuid::nil(), "pad0", meta, &options, design_context(&vars, &layers))
                .unwrap();
        let pad = Shape::Poly(draw::rectangle(0.1, 0.1, Point::new(0.0, 0.0)));
        assert!(matches!(
            ctx.add_pin_shape("east", &pad, 0.01),
            Err(CoreError::PinNotLine(name)) if name == "east"
        ));
        let edge = Shape::Line(draw::line(&[Point::new(0.05, 0.05), Point::new(0.05, -0.05)]));
        ctx.add_pin_shape("east", &edge, 0.01).unwrap();
        let out = ctx.finish();
        assert_eq!(out.pins.len(), 1);
        assert!((out.pin("east").unwrap().width - 0.01).abs() < 1e-12);
    }
}
