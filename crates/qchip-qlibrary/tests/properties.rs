//! Geometric properties of the claw transmon and the launch tip.
//!
//! Covers determinism, cutout enclosure of metal, rounding limits, arc-angle
//! conversion, identity placement, and the grounded-claw variant.

use geo::{Area, BooleanOps, MultiPolygon};
use proptest::prelude::*;
use qchip_core::{Design, Options, Point, RenderMode, Shape, Transform, Variables};
use qchip_qlibrary::{BodyParams, ClawParams, ClawTransmon, LaunchTip, LaunchTipParams};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn default_claw() -> ClawParams {
    ClawParams {
        res_arc: 0.050,
        res_dist: 0.025,
        res_ext: 0.025,
        res_angle: 90.0,
        claw_width: 0.010,
        rounding: 0.002,
        res_s: 0.006,
        grounded: false,
        res_g_s: 0.002,
        cpw_width: 0.012,
        cpw_gap: 0.012,
    }
}

/// Area of `metal` left uncovered by `cutout`.
fn uncovered(metal: &MultiPolygon<f64>, cutout: &MultiPolygon<f64>) -> f64 {
    metal.difference(cutout).unsigned_area()
}

fn poly(shape: &Shape) -> &MultiPolygon<f64> {
    shape.as_poly().expect("polygon row")
}

fn two_pad_options() -> Options {
    Options::new().with(
        "connection_pads",
        Options::new()
            .with("readout", Options::new().with("res_angle", "0"))
            .with(
                "bus",
                Options::new().with("res_angle", "135").with("res_g", true),
            ),
    )
}

// ============================================================================
// 1. Determinism
// ============================================================================

#[test]
fn test_repeated_construction_is_bit_identical() {
    init_logging();
    let mut first = Design::new("a");
    let mut second = Design::new("b");
    let a = first
        .add_component("Q1", ClawTransmon, two_pad_options())
        .unwrap();
    let b = second
        .add_component("Q1", ClawTransmon, two_pad_options())
        .unwrap();

    let rows_a = first.component_rows(&a);
    let rows_b = second.component_rows(&b);
    assert_eq!(rows_a.len(), rows_b.len());
    for (ra, rb) in rows_a.iter().zip(&rows_b) {
        assert_eq!(ra.name, rb.name);
        assert_eq!(ra.shape, rb.shape);
    }

    let before: Vec<Shape> = rows_a.iter().map(|r| r.shape.clone()).collect();
    first.rebuild().unwrap();
    let after: Vec<Shape> = first.component_rows(&a).iter().map(|r| r.shape.clone()).collect();
    assert_eq!(before, after);
}

// ============================================================================
// 2. Cutouts enclose their metal
// ============================================================================

#[test]
fn test_default_design_cutouts_enclose_metal() {
    init_logging();
    let mut design = Design::new("enclosure").with_render_mode(RenderMode::Simulate);
    let q = design
        .add_component("Q1", ClawTransmon, two_pad_options())
        .unwrap();
    let t = design.add_component("tip", LaunchTip, Options::new()).unwrap();

    let rows = design.qgeometry();
    let pairs = [
        (q, "Qubit", "Pocket"),
        (q, "readout_claw", "readout_claw_gap"),
        (q, "bus_claw", "bus_claw_gap"),
        (t, "xy_tip", "pocket"),
    ];
    for (id, metal, cutout) in pairs {
        let metal = poly(&rows.find(&id, metal).unwrap().shape);
        let cutout = poly(&rows.find(&id, cutout).unwrap().shape);
        assert!(uncovered(metal, cutout) < 1e-10);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_claw_gap_encloses_claw(
        res_arc in 0.040f64..0.200,
        res_dist in 0.0f64..0.050,
        res_ext in 0.005f64..0.060,
        res_angle in -180.0f64..180.0,
        claw_width in 0.004f64..0.030,
        rounding_ratio in 0.0f64..0.45,
        res_s in 0.001f64..0.020,
        grounded in any::<bool>(),
        cpw_width in 0.004f64..0.030,
        cpw_gap in 0.001f64..0.020,
    ) {
        let params = ClawParams {
            res_arc,
            res_dist,
            res_ext,
            res_angle,
            claw_width,
            rounding: rounding_ratio * claw_width,
            res_s,
            grounded,
            res_g_s: 0.002,
            cpw_width,
            cpw_gap,
        };
        let claw = params.build("pad", 0.125).unwrap();
        prop_assert!(uncovered(&claw.claw, &claw.gap) < 1e-10);
        prop_assert_eq!(claw.claw.0.len(), 1);
    }

    #[test]
    fn prop_pocket_encloses_island(
        rad_i in 0.020f64..0.300,
        gap in 0.005f64..0.100,
        jj_w in 0.001f64..0.020,
        simulate in any::<bool>(),
    ) {
        let body = BodyParams {
            pos_x: 0.0,
            pos_y: 0.0,
            rotation: 0.0,
            rad_i,
            gap,
            jj_w,
            layer: 1,
        };
        let mode = if simulate { RenderMode::Simulate } else { RenderMode::Layout };
        let geom = body.build(mode);
        prop_assert!(uncovered(&geom.island, &geom.pocket) < 1e-10);
    }

    #[test]
    fn prop_tip_pocket_encloses_tip(
        trace_width in 0.002f64..0.030,
        trace_gap in 0.001f64..0.020,
        lead_length in 0.001f64..0.050,
        tip_width in 0.002f64..0.030,
        tip_height in 0.020f64..0.200,
        tip_gap in 0.001f64..0.020,
        taper_height in 0.005f64..0.100,
        fillet_ratio in 0.0f64..0.5,
    ) {
        let params = LaunchTipParams {
            trace_width,
            trace_gap,
            lead_length,
            tip_width,
            tip_height,
            tip_gap,
            taper_height,
            tip_fillet: fillet_ratio * tip_width,
            pos_x: 0.0,
            pos_y: 0.0,
            orientation: 0.0,
            layer: 1,
        };
        params.validate("tip").unwrap();
        let geom = params.build();
        prop_assert!(uncovered(&geom.tip, &geom.pocket) < 1e-10);
    }
}

// ============================================================================
// 3. Rounding limits
// ============================================================================

#[test]
fn test_rounding_at_half_width_is_rejected() {
    let pad = Options::new().with("res_claw_width", "8um").with("res_claw_rounding", "4um");
    let mut design = Design::new("rounding");
    let result = design.add_component(
        "Q1",
        ClawTransmon,
        Options::new().with("connection_pads", Options::new().with("c", pad)),
    );
    assert!(result.is_err());
    assert!(design.component_by_name("Q1").is_none());
}

#[test]
fn test_rounded_claw_is_simple_contour() {
    for rounding in [0.0, 0.001, 0.002, 0.0045] {
        let params = ClawParams {
            rounding,
            ..default_claw()
        };
        let claw = params.build("c", 0.125).unwrap();
        assert_eq!(claw.claw.0.len(), 1, "rounding {rounding}");
        assert!(claw.claw.0[0].interiors().is_empty());
    }
}

// ============================================================================
// 4. Arc angle conversion
// ============================================================================

#[test]
fn test_arc_length_to_angle() {
    let rad_i = 0.125;
    let params = default_claw();
    let r = params.outer_radius(rad_i);
    assert!((r - 0.160).abs() < 1e-12);

    let quarter = ClawParams {
        res_arc: std::f64::consts::FRAC_PI_2 * r,
        ..params.clone()
    };
    assert!((quarter.arc_span(rad_i) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

    let one_radian = ClawParams {
        res_arc: r,
        ..params
    };
    assert!((one_radian.arc_span(rad_i) - 1.0).abs() < 1e-12);
}

// ============================================================================
// 5. Identity placement
// ============================================================================

#[test]
fn test_identity_transform_leaves_shapes_unchanged() {
    let identity = Transform::new(0.0, Point::new(0.0, 0.0));
    let claw = default_claw().build("c", 0.125).unwrap();
    assert_eq!(identity.place(&claw.claw), claw.claw);
    assert_eq!(identity.place(&claw.port), claw.port);

    let mut design = Design::new("identity");
    let id = design
        .add_component(
            "Q1",
            ClawTransmon,
            Options::new().with("pos_x", "0mm").with("pos_y", "0mm"),
        )
        .unwrap();
    let body = BodyParams {
        pos_x: 0.0,
        pos_y: 0.0,
        rotation: 0.0,
        rad_i: 0.125,
        gap: 0.025,
        jj_w: 0.010,
        layer: 1,
    };
    let local = body.build(RenderMode::Layout);
    let island = design.qgeometry().find(&id, "Qubit").unwrap();
    assert_eq!(poly(&island.shape), &local.island);
}

// ============================================================================
// 6. Grounded variant only moves the coupler outward
// ============================================================================

#[test]
fn test_grounded_claw_keeps_arm_geometry() {
    let rad_i = 0.125;
    for res_angle in [0.0, 90.0, 210.0] {
        let plain = ClawParams {
            res_angle,
            ..default_claw()
        };
        let grounded = ClawParams {
            grounded: true,
            ..plain.clone()
        };
        let iso = grounded.isolation();
        assert!((iso - 0.008).abs() < 1e-12);

        let a = plain.build("c", rad_i).unwrap();
        let b = grounded.build("c", rad_i).unwrap();

        // Same arm, shifted outward along the pad direction by the isolation.
        let outward = Point::new(0.0, -1.0).rotate(res_angle);
        let shifted = Transform::translate(outward.x * iso, outward.y * iso).place(&a.arm);
        assert!((shifted.unsigned_area() - b.arm.unsigned_area()).abs() < 1e-12);
        for (pa, pb) in shifted.0[0].exterior().0.iter().zip(b.arm.0[0].exterior().0.iter()) {
            assert!((pa.x - pb.x).abs() < 1e-12);
            assert!((pa.y - pb.y).abs() < 1e-12);
        }

        // The claw gap starts further from the island by the same amount.
        let nearest = |shape: &MultiPolygon<f64>| {
            shape.0[0]
                .exterior()
                .0
                .iter()
                .map(|c| Point::from(*c).length())
                .fold(f64::INFINITY, f64::min)
        };
        assert!((nearest(&b.gap) - nearest(&a.gap) - iso).abs() < 5e-5);
    }
}

#[test]
fn test_grounded_flag_resolved_from_options() {
    let vars = Variables::with_defaults();
    let pad = Options::new()
        .with("res_arc", "50um")
        .with("res_dist", "25um")
        .with("res_ext", "25um")
        .with("res_angle", "90")
        .with("res_claw_width", "10um")
        .with("res_claw_rounding", "2um")
        .with("res_s", "6um")
        .with("res_g", "True")
        .with("res_g_s", "2um")
        .with("cpw_width", "cpw_width")
        .with("cpw_gap", "cpw_gap");
    let params = ClawParams::resolve("c", &pad, &vars).unwrap();
    assert!(params.grounded);
    assert!((params.cpw_width - 0.010).abs() < 1e-12);
    assert!((params.cpw_gap - 0.006).abs() < 1e-12);
}
