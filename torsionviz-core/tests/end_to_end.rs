use std::f64::consts::TAU;

use torsionviz_core::mesh::ANGULAR_RESOLUTION;
use torsionviz_core::{
    calculate, generate_twisted_surface, Camera, DrawCommand, FrameOutcome, InputEvent,
    ParamInputs, PointInput, PointerEvent, ProjectedPoint, RecordingSurface, ShaftParams, Surface,
    Viewport, Visualizer,
};

fn reference_shaft() -> ShaftParams {
    ShaftParams {
        length: 2.0,
        outer_diameter: 0.1,
        inner_diameter: 0.0,
        segments: 10,
        torque: 100.0,
        shear_modulus: 80.0,
        elastic_modulus: 200.0,
        poisson_ratio: 0.3,
    }
}

fn angular_offset(a: (f64, f64), b: (f64, f64)) -> f64 {
    let offset = b.1.atan2(b.0) - a.1.atan2(a.0);
    offset.rem_euclid(TAU)
}

#[test]
fn last_ring_is_rotated_by_the_twist_angle() {
    let params = reference_shaft();
    let deformation_scale = 1.0;
    let theta = deformation_scale * calculate(&params).twist_angle;

    let mut visualizer = Visualizer::default();
    let mut surface = RecordingSurface::new(800.0, 600.0);
    let (_, outcome) = visualizer.update(&mut surface, &params, deformation_scale);
    assert!(matches!(outcome, FrameOutcome::Drawn(_)));

    let (_, deformation) = visualizer.current().unwrap();
    assert!((deformation - theta).abs() < 1e-15);

    let mesh = generate_twisted_surface(&params, deformation).unwrap();
    for j in 0..=ANGULAR_RESOLUTION {
        let first = mesh.get(0, j).unwrap().position;
        let last = mesh.get(params.segments, j).unwrap().position;
        let offset = angular_offset((first.x, first.y), (last.x, last.y));
        assert!(
            (offset - theta).abs() < 1e-9,
            "column {} rotated by {} instead of {}",
            j,
            offset,
            theta
        );
    }
}

#[test]
fn exaggerated_twist_is_visible() {
    let params = reference_shaft();
    let theta = 1.2;
    let mesh = generate_twisted_surface(&params, theta).unwrap();
    for j in [0, 12, 24, 36] {
        let first = mesh.get(0, j).unwrap().position;
        let last = mesh.get(10, j).unwrap().position;
        let offset = angular_offset((first.x, first.y), (last.x, last.y));
        assert!((offset - theta).abs() < 1e-9);
    }
}

#[test]
fn missing_coordinate_projects_to_degenerate_point() {
    let camera = Camera::default();
    let viewport = Viewport::new(800.0, 600.0, 300.0);
    let input = PointInput {
        x: Some(0.1),
        y: Some(0.2),
        z: None,
    };
    assert_eq!(
        camera.project_input(input, &viewport),
        ProjectedPoint {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            depth: 0.0
        }
    );
    assert_ne!(
        camera.project_input(PointInput::new(0.1, 0.2, 0.3), &viewport),
        ProjectedPoint::DEGENERATE
    );
}

#[test]
fn text_inputs_drive_a_full_frame() {
    let inputs = ParamInputs {
        length: "2".into(),
        outer_diameter: "0.1".into(),
        segments: "abc".into(),
        torque: "100 N·m".into(),
        deformation_scale: "500".into(),
        ..Default::default()
    };
    let (params, scale) = inputs.resolve();
    assert_eq!(params.segments, 10);
    assert_eq!(params.torque, 100.0);

    let mut visualizer = Visualizer::default();
    let mut surface = RecordingSurface::new(1024.0, 768.0);
    let (results, outcome) = visualizer.update(&mut surface, &params, scale);
    let FrameOutcome::Drawn(stats) = outcome else {
        panic!("frame was not drawn");
    };

    let deformed = stats.deformed.unwrap();
    assert_eq!(deformed.quads_drawn, 10 * ANGULAR_RESOLUTION);
    assert!(deformed.depths.windows(2).all(|w| w[0] >= w[1]));

    let texts: Vec<&str> = surface.texts().collect();
    let expected_mid = format!("θ = {:.1}°", (scale * results.twist_angle * 0.5).to_degrees());
    assert!(texts.contains(&expected_mid.as_str()));
    assert!(texts.iter().any(|t| t.starts_with("τmax")));
}

#[test]
fn rapid_input_redraws_every_time() {
    let mut visualizer = Visualizer::default();
    let mut surface = RecordingSurface::new(800.0, 600.0);
    visualizer.render(&mut surface, &reference_shaft(), 0.8);

    for step in 0..5 {
        let x = f64::from(step) * 10.0;
        let event = if step == 0 {
            PointerEvent::Press { x, y: 0.0 }
        } else {
            PointerEvent::Move { x, y: 5.0 }
        };
        let outcome = visualizer.handle_input(&mut surface, InputEvent::Pointer(event));
        if step > 0 {
            assert!(matches!(outcome, Some(FrameOutcome::Drawn(_))));
            // each pass clears before drawing
            assert_eq!(surface.count(|c| *c == DrawCommand::Clear), 1);
        }
    }
    assert_eq!(surface.size(), (800.0, 600.0));
}
