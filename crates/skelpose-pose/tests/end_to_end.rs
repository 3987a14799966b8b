use approx::assert_relative_eq;
use nalgebra::{Point2, Point3, UnitQuaternion, Vector3};
use skelpose_core::{Detection, JointHierarchy, JointSpec, RgbImage};
use skelpose_pose::{
    apply_rotations, ArmatureRig, Degradation, JointRotation, PoseDetections, PoseExtractor,
    PoseParams, PoseRig, PoseViews, RotationMap, RotationSource, ViewKind,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn joint(name: &str, parent: Option<&str>, head: [f64; 3], tail: [f64; 3]) -> JointSpec {
    JointSpec {
        name: name.into(),
        parent: parent.map(Into::into),
        head: Point3::from(head),
        tail: Point3::from(tail),
    }
}

fn single_joint() -> JointHierarchy {
    JointHierarchy::new(vec![joint("bone", None, [0.0, 0.0, 0.0], [0.0, 1.0, 0.0])])
        .expect("hierarchy")
}

fn two_joints() -> JointHierarchy {
    JointHierarchy::new(vec![
        joint("upper", None, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        joint("lower", Some("upper"), [0.0, 0.0, 1.0], [0.0, 0.0, 2.0]),
    ])
    .expect("hierarchy")
}

fn det(points: &[(f32, f32)]) -> Detection {
    Detection {
        width: 100,
        height: 100,
        points: points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
    }
}

/// Square red blobs of 4x4 px centred on each `(x, y)`.
fn render(points: &[(i64, i64)]) -> RgbImage {
    let mut img = RgbImage::new(100, 100);
    for &(cx, cy) in points {
        for y in cy - 2..cy + 2 {
            for x in cx - 2..cx + 2 {
                img.put_pixel(x, y, [255, 0, 0]);
            }
        }
    }
    img
}

#[test]
fn scenario_a_quarter_turn_about_z() {
    init_logging();
    // rest: head (0,0,0) -> tail along +y; target: tail along +x.
    let detections = PoseDetections {
        front_rest: det(&[(50.0, 50.0), (50.0, 50.0)]),
        side_rest: det(&[(50.0, 50.0), (90.0, 50.0)]),
        front_target: det(&[(50.0, 50.0), (90.0, 50.0)]),
        side_target: det(&[(50.0, 50.0), (50.0, 50.0)]),
    };
    let mut rig = ArmatureRig::new("Armature", single_joint());
    let extractor = PoseExtractor::new(PoseParams::default().with_influence(1.0));
    let result = extractor.process_detections(&detections, &mut rig);

    assert!(result.success, "{:?}", result.error);
    let rotations = result.rotations.expect("rotations");
    let rot = &rotations["bone"];
    assert_eq!(rot.source, RotationSource::Solved);
    assert_relative_eq!(rot.rotation.angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    let axis = rot.rotation.axis().expect("axis");
    assert_relative_eq!(axis.z.abs(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(
        rot.rotation * Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        epsilon = 1e-9
    );
    assert_eq!(rig.joint_rotation("bone"), Some(rot.rotation));
}

#[test]
fn scenario_b_truncation_leaves_second_joint_unmatched() {
    init_logging();
    let front = det(&[(10.0, 10.0), (20.0, 20.0), (30.0, 30.0), (40.0, 40.0)]);
    let side = det(&[(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)]);
    let detections = PoseDetections {
        front_rest: front.clone(),
        side_rest: side.clone(),
        front_target: front,
        side_target: side,
    };
    let mut rig = ArmatureRig::new("Armature", two_joints());
    let result = PoseExtractor::new(PoseParams::default()).process_detections(&detections, &mut rig);

    assert!(result.success);
    let diag = &result.diagnostics;
    assert_eq!(diag.rest_points, 3);
    assert_eq!(diag.target_points, 3);
    assert_eq!(diag.matched, vec!["upper".to_string()]);
    assert_eq!(diag.unmatched, vec!["lower".to_string()]);
    assert!(diag.degradations.contains(&Degradation::CorrespondenceMismatch {
        configuration: "rest".into(),
        front: 4,
        side: 3,
    }));
    assert!(diag.degradations.contains(&Degradation::InsufficientPoints {
        configuration: "target".into(),
        available: 3,
        required: 4,
    }));
    let rotations = result.rotations.expect("rotations");
    assert_eq!(rotations["lower"].source, RotationSource::Unmatched);
    assert_eq!(rig.joint_rotation("lower"), Some(UnitQuaternion::identity()));
}

#[test]
fn scenario_c_blank_target_image_keeps_rig_at_rest() {
    init_logging();
    let rest_front = render(&[(50, 20), (50, 80)]);
    let rest_side = render(&[(50, 20), (50, 80)]);
    let blank = RgbImage::new(100, 100);
    let target_side = render(&[(30, 30), (70, 70)]);
    let views = PoseViews {
        front_rest: rest_front.view(),
        side_rest: rest_side.view(),
        front_target: blank.view(),
        side_target: target_side.view(),
    };

    let mut rig = ArmatureRig::new("Armature", single_joint());
    let result = PoseExtractor::new(PoseParams::default()).process(&views, &mut rig);

    assert!(result.success);
    let rotations = result.rotations.expect("rotations");
    assert_eq!(rotations.len(), 1);
    assert!(rotations
        .values()
        .all(|r| r.rotation == UnitQuaternion::identity()));
    assert_eq!(result.diagnostics.detections.get(ViewKind::FrontTarget), 0);
    assert!(result.diagnostics.degradations.contains(&Degradation::DetectionEmpty {
        view: ViewKind::FrontTarget
    }));
    assert!(rig.is_at_rest());
}

#[test]
fn rendered_views_recover_bone_direction() {
    init_logging();
    let rest = render(&[(50, 20), (50, 80)]);
    let target = render(&[(30, 30), (70, 70)]);
    let views = PoseViews {
        front_rest: rest.view(),
        side_rest: rest.view(),
        front_target: target.view(),
        side_target: target.view(),
    };
    let extractor = PoseExtractor::new(PoseParams::default());
    let solution = extractor.solve_views(&views, &single_joint());

    assert_eq!(solution.diagnostics.detections.front_rest, 2);
    assert!(!solution.diagnostics.is_degraded());
    let r = solution.rest.get("bone").expect("rest pair").vector();
    let t = solution.target.get("bone").expect("target pair").vector();
    let q = solution.rotations["bone"].rotation;
    let mapped = q * r;
    assert!(mapped.normalize().dot(&t.normalize()) >= 0.999);
}

#[test]
fn identity_rotations_leave_rig_at_rest() {
    let hierarchy = two_joints();
    let mut rig = ArmatureRig::new("Armature", hierarchy.clone());
    let rotations: RotationMap = hierarchy
        .joints()
        .iter()
        .map(|j| {
            (
                j.name.clone(),
                JointRotation::identity(j.name.clone(), RotationSource::Solved),
            )
        })
        .collect();
    let before = rig.pose_snapshot();
    let report = apply_rotations(&mut rig, &rotations).expect("apply");
    assert_eq!(report.written.len(), 2);
    assert_eq!(rig.pose_snapshot(), before);
    assert!(rig.is_at_rest());
}

#[test]
fn dead_rig_fails_the_whole_call() {
    let rest = render(&[(50, 20), (50, 80)]);
    let target = render(&[(30, 30), (70, 70)]);
    let views = PoseViews {
        front_rest: rest.view(),
        side_rest: rest.view(),
        front_target: target.view(),
        side_target: target.view(),
    };
    let mut rig = ArmatureRig::new("Armature", single_joint());
    rig.invalidate();
    let result = PoseExtractor::new(PoseParams::default()).process(&views, &mut rig);
    assert!(!result.success);
    assert!(result.rotations.is_none());
    assert!(result.error.expect("error").contains("Armature"));
    assert!(rig.is_at_rest());
}
