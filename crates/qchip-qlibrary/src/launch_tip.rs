//! Wire-bond launch tip: a trace that tapers into a wider, rounded pad.
//!
//! Local frame: the taper neck is at the origin, the lead runs along +x to
//! `lead_length` and the pad extends along -x. The pin `tie` sits across the
//! end of the lead.

use geo::{LineString, MultiPolygon};
use qchip_core::draw;
use qchip_core::{
    Component, ComponentMetadata, CoreError, LayerId, MakeContext, Options, Point, Result, Shape,
    TableKind, Transform,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchTip;

impl Component for LaunchTip {
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("Tip", &[TableKind::Poly])
            .with_tooltip("Tapered launch tip with rounded pad corners")
    }

    fn default_options(&self) -> Options {
        Options::new()
            .with("trace_width", "cpw_width")
            .with("trace_gap", "cpw_gap")
            .with("lead_length", "10um")
            .with("tip_width", "5um")
            .with("tip_height", "100um")
            .with("tip_gap", "3um")
            .with("taper_height", "50um")
            .with("tip_fillet", "1um")
            .with("pos_x", "0um")
            .with("pos_y", "0um")
            .with("orientation", "0")
            .with("layer", "1")
            .with("chip", "main")
    }

    fn make(&self, ctx: &mut MakeContext<'_>) -> Result<()> {
        let params = LaunchTipParams::resolve(ctx)?;
        let local = params.build();
        let [tip, pocket, tie] = params.transform().place_all([
            Shape::Poly(local.tip),
            Shape::Poly(local.pocket),
            Shape::Line(local.tie),
        ]);

        ctx.add_qgeometry(TableKind::Poly, [("xy_tip", tip)], params.layer, false, 0.0)?;
        ctx.add_qgeometry(TableKind::Poly, [("pocket", pocket)], params.layer, true, 0.0)?;
        ctx.add_pin_shape("tie", &tie, params.trace_width)
    }
}

/// Resolved launch-tip options, lengths in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchTipParams {
    pub trace_width: f64,
    pub trace_gap: f64,
    pub lead_length: f64,
    pub tip_width: f64,
    pub tip_height: f64,
    pub tip_gap: f64,
    pub taper_height: f64,
    pub tip_fillet: f64,
    pub pos_x: f64,
    pub pos_y: f64,
    pub orientation: f64,
    pub layer: LayerId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchTipGeometry {
    pub tip: MultiPolygon<f64>,
    pub pocket: MultiPolygon<f64>,
    pub tie: LineString<f64>,
}

impl LaunchTipParams {
    pub fn resolve(ctx: &MakeContext<'_>) -> Result<Self> {
        let params = Self {
            trace_width: ctx.length("trace_width")?,
            trace_gap: ctx.length("trace_gap")?,
            lead_length: ctx.length("lead_length")?,
            tip_width: ctx.length("tip_width")?,
            tip_height: ctx.length("tip_height")?,
            tip_gap: ctx.length("tip_gap")?,
            taper_height: ctx.length("taper_height")?,
            tip_fillet: ctx.length("tip_fillet")?,
            pos_x: ctx.length("pos_x")?,
            pos_y: ctx.length("pos_y")?,
            orientation: ctx.angle("orientation")?,
            layer: ctx.layer("layer")?,
        };
        params.validate(ctx.name())?;
        Ok(params)
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        let positive = [
            ("trace_width", self.trace_width),
            ("lead_length", self.lead_length),
            ("tip_width", self.tip_width),
            ("tip_height", self.tip_height),
            ("taper_height", self.taper_height),
        ];
        for (key, value) in positive {
            if value <= 0.0 {
                return Err(CoreError::degenerate(name, format!("{key} must be positive")));
            }
        }
        let non_negative = [
            ("trace_gap", self.trace_gap),
            ("tip_gap", self.tip_gap),
            ("tip_fillet", self.tip_fillet),
        ];
        for (key, value) in non_negative {
            if value < 0.0 {
                return Err(CoreError::degenerate(name, format!("{key} must not be negative")));
            }
        }
        if self.tip_fillet > self.tip_width / 2.0 || self.tip_fillet > self.tip_height {
            return Err(CoreError::degenerate(
                name,
                "tip_fillet must fit inside the tip pad",
            ));
        }
        Ok(())
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.orientation, Point::new(self.pos_x, self.pos_y))
    }

    fn outline(&self, half_trace: f64, half_tip: f64, far_x: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, half_trace),
            Point::new(-self.taper_height, half_tip),
            Point::new(far_x, half_tip),
            Point::new(far_x, -half_tip),
            Point::new(-self.taper_height, -half_tip),
            Point::new(0.0, -half_trace),
            Point::new(self.lead_length, -half_trace),
            Point::new(self.lead_length, half_trace),
        ]
    }

    /// Build the tip, its pocket and the pin line in the local frame.
    pub fn build(&self) -> LaunchTipGeometry {
        let far_x = -(self.taper_height + self.tip_height);
        let half_tip = self.tip_width / 2.0;

        let mut tip = draw::polygon(&self.outline(self.trace_width / 2.0, half_tip, far_x));
        if self.tip_fillet > 0.0 {
            let top = draw::corner_cutout(Point::new(far_x, half_tip), (1.0, -1.0), self.tip_fillet);
            let bottom =
                draw::corner_cutout(Point::new(far_x, -half_tip), (1.0, 1.0), self.tip_fillet);
            tip = draw::subtract(&tip, &draw::union(&top, &bottom));
        }

        let pocket = draw::polygon(&self.outline(
            self.trace_width / 2.0 + self.trace_gap,
            half_tip + self.tip_gap,
            far_x - self.tip_gap,
        ));

        let tie = draw::line(&[
            Point::new(self.lead_length, self.trace_width / 2.0),
            Point::new(self.lead_length, -self.trace_width / 2.0),
        ]);

        LaunchTipGeometry { tip, pocket, tie }
    }
}
