//! Circular transmon island with claw readout couplers.
//!
//! The island is a disk centred on `(pos_x, pos_y)` inside a larger pocket
//! cut from the ground plane; the junction sits due south of the centre
//! before rotation. Each entry of `connection_pads` adds one claw: an arc
//! concentric with the island, stroked to `res_claw_width`, with a straight
//! arm running radially outward to the pin. `res_angle` turns a claw
//! counter-clockwise away from the junction direction.
//!
//! With `res_g` set, the claw and arm move outward by `res_s + res_g_s` so a
//! strip of ground stays between the claw gap and the island pocket.

use std::f64::consts::TAU;

use geo::{LineString, MultiPolygon};
use qchip_core::draw::{self, Wedge};
use qchip_core::{
    Component, ComponentMetadata, CoreError, MakeContext, Options, Point, RenderMode, Result,
    Shape, TableKind, Transform, Variables,
};
use serde::{Deserialize, Serialize};

/// Height of the junction launch pads drawn in simulate mode (1 µm).
pub const JJ_PAD_HEIGHT: f64 = 1e-3;
/// Distance the junction line stops short of the island and the pocket edge.
pub const JJ_LINE_INSET: f64 = 0.5e-3;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClawTransmon;

impl Component for ClawTransmon {
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("Turtle", &[TableKind::Poly, TableKind::Junction])
            .with_tooltip("Circular transmon island with claw readout couplers")
    }

    fn default_options(&self) -> Options {
        let pad_defaults = Options::new()
            .with("res_arc", "50um")
            .with("res_dist", "25um")
            .with("res_ext", "25um")
            .with("res_angle", "90")
            .with("res_claw_width", "10um")
            .with("res_claw_rounding", "2um")
            .with("res_s", "6um")
            .with("res_g", false)
            .with("res_g_s", "2um")
            .with("cpw_width", "12um")
            .with("cpw_gap", "12um");
        Options::new()
            .with("pos_x", "1 mm")
            .with("pos_y", "1 mm")
            .with("rotation", "0.0")
            .with("rad_i", "125um")
            .with("gap", "25um")
            .with("jj_w", "10um")
            .with("layer", "1")
            .with("chip", "main")
            .with(qchip_core::options::CONNECTION_PADS, Options::new())
            .with(qchip_core::options::DEFAULT_CONNECTION_PADS, pad_defaults)
    }

    fn make(&self, ctx: &mut MakeContext<'_>) -> Result<()> {
        let body = BodyParams::resolve(ctx)?;
        let placement = body.transform();

        let local = body.build(ctx.render_mode());
        let [island, pocket, junction] = placement.place_all([
            Shape::Poly(local.island),
            Shape::Poly(local.pocket),
            Shape::Line(local.junction),
        ]);
        ctx.add_qgeometry(TableKind::Poly, [("Qubit", island)], body.layer, false, 0.0)?;
        ctx.add_qgeometry(TableKind::Poly, [("Pocket", pocket)], body.layer, true, 0.0)?;
        ctx.add_qgeometry(
            TableKind::Junction,
            [("rect_jj", junction)],
            body.layer,
            false,
            body.jj_w,
        )?;

        for (name, pad) in ctx.connection_pads()? {
            let params = ClawParams::resolve(&name, &pad, ctx.variables())?;
            log::debug!(
                "{}: claw '{}' at {}° (grounded={})",
                ctx.name(),
                name,
                params.res_angle,
                params.grounded
            );
            let local = params.build(&name, body.rad_i)?;
            let [claw, gap, port] = placement.place_all([
                Shape::Poly(local.claw),
                Shape::Poly(local.gap),
                Shape::Line(local.port),
            ]);
            ctx.add_qgeometry(
                TableKind::Poly,
                [(format!("{name}_claw"), claw)],
                body.layer,
                false,
                0.0,
            )?;
            ctx.add_qgeometry(
                TableKind::Poly,
                [(format!("{name}_claw_gap"), gap)],
                body.layer,
                true,
                0.0,
            )?;
            ctx.add_pin_shape(&name, &port, params.cpw_width)?;
        }
        Ok(())
    }
}

/// Resolved options of the island and pocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    pub pos_x: f64,
    pub pos_y: f64,
    pub rotation: f64,
    pub rad_i: f64,
    pub gap: f64,
    pub jj_w: f64,
    pub layer: qchip_core::LayerId,
}

/// Island, pocket and junction line in the local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyGeometry {
    pub island: MultiPolygon<f64>,
    pub pocket: MultiPolygon<f64>,
    pub junction: LineString<f64>,
}

impl BodyParams {
    pub fn resolve(ctx: &MakeContext<'_>) -> Result<Self> {
        let params = Self {
            pos_x: ctx.length("pos_x")?,
            pos_y: ctx.length("pos_y")?,
            rotation: ctx.angle("rotation")?,
            rad_i: ctx.length("rad_i")?,
            gap: ctx.length("gap")?,
            jj_w: ctx.length("jj_w")?,
            layer: ctx.layer("layer")?,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<()> {
        if self.rad_i <= 0.0 {
            return Err(CoreError::degenerate("island", "rad_i must be positive"));
        }
        if self.gap <= 2.0 * JJ_LINE_INSET {
            return Err(CoreError::degenerate(
                "pocket",
                "gap must be wider than the junction line insets",
            ));
        }
        if self.jj_w <= 0.0 {
            return Err(CoreError::degenerate("junction", "jj_w must be positive"));
        }
        Ok(())
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.rotation, Point::new(self.pos_x, self.pos_y))
    }

    /// Build the body centred on the origin. In simulate mode the island
    /// gains a junction launch pad and the pocket a matching notch.
    pub fn build(&self, mode: RenderMode) -> BodyGeometry {
        let origin = Point::new(0.0, 0.0);
        let mut island = draw::circle(origin, self.rad_i);
        let mut pocket = draw::circle(origin, self.rad_i + self.gap);

        if mode == RenderMode::Simulate {
            let island_pad = draw::rectangle(self.jj_w, JJ_PAD_HEIGHT, Point::new(0.0, -self.rad_i));
            let pocket_notch = draw::rectangle(
                self.jj_w,
                JJ_PAD_HEIGHT,
                Point::new(0.0, -(self.rad_i + self.gap)),
            );
            island = draw::union(&island, &island_pad);
            pocket = draw::subtract(&pocket, &pocket_notch);
        }

        let junction = draw::line(&[
            Point::new(0.0, -(self.rad_i + self.gap - JJ_LINE_INSET)),
            Point::new(0.0, -(self.rad_i + JJ_LINE_INSET)),
        ]);

        BodyGeometry {
            island,
            pocket,
            junction,
        }
    }
}

/// Resolved options of one claw coupler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClawParams {
    pub res_arc: f64,
    pub res_dist: f64,
    pub res_ext: f64,
    /// Degrees counter-clockwise from the junction direction.
    pub res_angle: f64,
    pub claw_width: f64,
    pub rounding: f64,
    pub res_s: f64,
    pub grounded: bool,
    pub res_g_s: f64,
    pub cpw_width: f64,
    pub cpw_gap: f64,
}

/// Claw metal, its ground-plane cutout and the pin line, in the island's
/// local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ClawGeometry {
    /// Rounded arc unioned with the arm.
    pub claw: MultiPolygon<f64>,
    /// Arm alone, before the union.
    pub arm: MultiPolygon<f64>,
    pub gap: MultiPolygon<f64>,
    pub port: LineString<f64>,
}

impl ClawParams {
    pub fn resolve(name: &str, pad: &Options, vars: &Variables) -> Result<Self> {
        let params = Self {
            res_arc: pad.length("res_arc", vars)?,
            res_dist: pad.length("res_dist", vars)?,
            res_ext: pad.length("res_ext", vars)?,
            res_angle: pad.angle("res_angle")?,
            claw_width: pad.length("res_claw_width", vars)?,
            rounding: pad.length("res_claw_rounding", vars)?,
            res_s: pad.length("res_s", vars)?,
            grounded: pad.flag("res_g")?,
            res_g_s: pad.length("res_g_s", vars)?,
            cpw_width: pad.length("cpw_width", vars)?,
            cpw_gap: pad.length("cpw_gap", vars)?,
        };
        params.validate(name)?;
        Ok(params)
    }

    fn validate(&self, name: &str) -> Result<()> {
        let positive = [
            ("res_arc", self.res_arc),
            ("res_claw_width", self.claw_width),
            ("cpw_width", self.cpw_width),
        ];
        for (key, value) in positive {
            if value <= 0.0 {
                return Err(CoreError::degenerate(name, format!("{key} must be positive")));
            }
        }
        let non_negative = [
            ("res_dist", self.res_dist),
            ("res_ext", self.res_ext),
            ("res_claw_rounding", self.rounding),
            ("res_s", self.res_s),
            ("res_g_s", self.res_g_s),
            ("cpw_gap", self.cpw_gap),
        ];
        for (key, value) in non_negative {
            if value < 0.0 {
                return Err(CoreError::degenerate(name, format!("{key} must not be negative")));
            }
        }
        if self.rounding >= self.claw_width / 2.0 {
            return Err(CoreError::degenerate(
                name,
                "res_claw_rounding must be less than half of res_claw_width",
            ));
        }
        Ok(())
    }

    /// Radial shift of the whole coupler when it is ground-isolated.
    pub fn isolation(&self) -> f64 {
        if self.grounded {
            self.res_s + self.res_g_s
        } else {
            0.0
        }
    }

    /// Radius of the claw centreline.
    pub fn centerline_radius(&self, rad_i: f64) -> f64 {
        rad_i + self.res_dist + self.claw_width / 2.0 + self.isolation()
    }

    /// Radius used to turn `res_arc` into an angle: the claw's outer edge.
    pub fn outer_radius(&self, rad_i: f64) -> f64 {
        rad_i + self.res_dist + self.claw_width + self.isolation()
    }

    /// Angular extent of the claw in radians.
    pub fn arc_span(&self, rad_i: f64) -> f64 {
        self.res_arc / self.outer_radius(rad_i)
    }

    /// The sector whose side rays bound the claw arc.
    pub fn wedge(&self, rad_i: f64) -> Wedge {
        Wedge {
            center: (self.res_angle - 90.0).to_radians(),
            span: self.arc_span(rad_i),
        }
    }

    /// Build the coupler around an island of radius `rad_i`.
    pub fn build(&self, name: &str, rad_i: f64) -> Result<ClawGeometry> {
        let span = self.arc_span(rad_i);
        if span >= TAU {
            return Err(CoreError::degenerate(
                name,
                format!("res_arc wraps the full circle ({span:.3} rad)"),
            ));
        }

        let arc = self.wedge(rad_i).clip_circle(self.centerline_radius(rad_i));
        let stroked = draw::stroke_arc(&arc, self.claw_width);
        let rounded = draw::fillet(&stroked, self.rounding);
        if rounded.0.len() != 1 || !rounded.0[0].interiors().is_empty() {
            return Err(CoreError::degenerate(
                name,
                "claw rounding did not leave a single closed outline",
            ));
        }

        let arm_length = self.res_ext + self.claw_width / 2.0;
        let arm_y = -(rad_i + self.res_dist + (self.claw_width + self.res_ext) / 2.0 + self.isolation());
        let port_y = arm_y - arm_length / 2.0;
        let toward_pad = Transform::rotate(self.res_angle);

        let arm = toward_pad.place(&draw::rectangle(
            self.cpw_width,
            arm_length,
            Point::new(0.0, arm_y),
        ));
        let port = toward_pad.place(&draw::line(&[
            Point::new(self.cpw_width / 2.0, port_y),
            Point::new(-self.cpw_width / 2.0, port_y),
        ]));

        let claw_gap = draw::offset(&stroked, self.res_s);
        let arm_gap = toward_pad.place(&draw::rectangle(
            self.cpw_width + 2.0 * self.cpw_gap,
            arm_length,
            Point::new(0.0, arm_y),
        ));

        Ok(ClawGeometry {
            claw: draw::union(&rounded, &arm),
            arm,
            gap: draw::union(&claw_gap, &arm_gap),
            port,
        })
    }
}
