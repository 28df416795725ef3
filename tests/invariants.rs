//! Universal engine invariants: linearity, selection invariance,
//! determinism, boundary cases, cancellation

use approx::assert_relative_eq;
use flex_solver::prelude::*;

fn material() -> Material {
    Material::new(200e6, 1.2e-5)
}

fn section() -> Section {
    Section::new(5.38e-3, 2.772e-5).with_depth(0.27)
}

/// Portal frame with a mixed load case
fn loaded_portal() -> Model {
    let mut model = Model::new();
    model.add_material(1, material()).unwrap();
    model.add_section(1, section()).unwrap();
    model.add_joint(1, Joint::new(0.0, 4.0)).unwrap();
    model.add_joint(2, Joint::new(6.0, 4.0)).unwrap();
    model.add_joint(3, Joint::new(0.0, 0.0)).unwrap();
    model.add_joint(4, Joint::new(6.0, 0.0)).unwrap();
    model.add_bar(1, Bar::new(1, 3, 1, 1)).unwrap();
    model.add_bar(2, Bar::new(2, 4, 1, 1)).unwrap();
    model.add_bar(3, Bar::new(3, 4, 1, 1)).unwrap();
    model.add_support(1, Support::fixed()).unwrap();
    model.add_support(2, Support::fixed()).unwrap();
    model.add_load(JointLoad::horizontal(3, 20.0)).unwrap();
    model.add_load(DistributedLoad::uniform(3, 4.0)).unwrap();
    model
        .add_load(BarPointLoad::transverse(3, 15.0, 2.0))
        .unwrap();
    model
}

#[test]
fn doubling_loads_doubles_everything() {
    let model = loaded_portal();
    let base = model.analyze(&AnalysisOptions::default()).unwrap();

    let mut doubled_model = loaded_portal();
    doubled_model.loads = model.loads.iter().map(|l| l.scaled(2.0)).collect();
    let doubled = doubled_model.analyze(&AnalysisOptions::default()).unwrap();

    for (joint, r) in &base.reactions {
        let d = &doubled.reactions[joint];
        assert_relative_eq!(d.rx, 2.0 * r.rx, max_relative = 1e-10, epsilon = 1e-10);
        assert_relative_eq!(d.ry, 2.0 * r.ry, max_relative = 1e-10, epsilon = 1e-10);
        assert_relative_eq!(d.mz, 2.0 * r.mz, max_relative = 1e-10, epsilon = 1e-10);
    }
    for (&bar, f) in &base.bar_fields {
        let d = &doubled.bar_fields[&bar];
        for x in [0.0f64, 1.0, 2.5, 4.0] {
            let x = x.min(f.length);
            assert_relative_eq!(d.m(x), 2.0 * f.m(x), max_relative = 1e-10, epsilon = 1e-10);
            assert_relative_eq!(d.v(x), 2.0 * f.v(x), max_relative = 1e-10, epsilon = 1e-10);
            assert_relative_eq!(d.n(x), 2.0 * f.n(x), max_relative = 1e-10, epsilon = 1e-10);
        }
    }
    for (joint, u) in &base.joint_displacements {
        let d = &doubled.joint_displacements[joint];
        assert_relative_eq!(d.ux, 2.0 * u.ux, max_relative = 1e-10, epsilon = 1e-14);
        assert_relative_eq!(d.uy, 2.0 * u.uy, max_relative = 1e-10, epsilon = 1e-14);
        assert_relative_eq!(d.rz, 2.0 * u.rz, max_relative = 1e-10, epsilon = 1e-14);
    }
}

#[test]
fn admissible_selections_agree() {
    let fixed_fixed = || {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, material()).unwrap();
        model.add_section(1, section()).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::fixed()).unwrap();
        model.add_support(2, Support::fixed()).unwrap();
        model
            .add_load(BarPointLoad::transverse(1, 10.0, 2.0))
            .unwrap();
        model
    };

    let auto = fixed_fixed().analyze(&AnalysisOptions::default()).unwrap();
    let manual = fixed_fixed()
        .analyze(&AnalysisOptions::default().with_redundants(vec![
            Redundant::ReactionMz { joint: 2 },
            Redundant::ReactionY { joint: 2 },
            Redundant::ReactionX { joint: 2 },
        ]))
        .unwrap();

    assert_ne!(auto.redundants, manual.redundants);
    for joint in [1_u32, 2] {
        assert_relative_eq!(
            auto.reactions[&joint].ry,
            manual.reactions[&joint].ry,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            auto.reactions[&joint].mz,
            manual.reactions[&joint].mz,
            epsilon = 1e-6
        );
    }
    for x in [0.0, 1.0, 2.0, 3.0, 5.0, 6.0] {
        assert_relative_eq!(
            auto.bar_fields[&1].m(x),
            manual.bar_fields[&1].m(x),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            auto.bar_fields[&1].v(x),
            manual.bar_fields[&1].v(x),
            epsilon = 1e-6
        );
    }
}

#[test]
fn analysis_is_deterministic() {
    let model = loaded_portal();
    let a = model.analyze(&AnalysisOptions::default()).unwrap();
    let b = model.analyze(&AnalysisOptions::default()).unwrap();

    let da = serde_json::to_string(&a.diagnostics).unwrap();
    let db = serde_json::to_string(&b.diagnostics).unwrap();
    assert_eq!(da, db);

    let xa = serde_json::to_string(&a.x).unwrap();
    let xb = serde_json::to_string(&b.x).unwrap();
    assert_eq!(xa, xb);
}

#[test]
fn result_object_round_trips_through_json() {
    let model = loaded_portal();
    let result = model.analyze(&AnalysisOptions::default()).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();

    assert_eq!(back.gh, result.gh);
    assert_eq!(back.redundants, result.redundants);
    // Sampled fields survive the round trip exactly
    let f = &result.bar_fields[&3];
    let g = &back.bar_fields[&3];
    for x in [0.0, 1.1, 3.3, 6.0] {
        assert_eq!(f.m(x), g.m(x));
    }
}

#[test]
fn single_bar_cantilever() {
    let mut model = Model::new();
    model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
    model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
    model.add_material(1, material()).unwrap();
    model.add_section(1, section()).unwrap();
    model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
    model.add_support(1, Support::fixed()).unwrap();
    model.add_load(JointLoad::downward(2, 10.0)).unwrap();

    let result = model.analyze(&AnalysisOptions::default()).unwrap();
    assert_eq!(result.gh, 0);
    assert!(result.redundants.is_empty());

    let r = result.reactions[&1];
    assert_relative_eq!(r.ry, -10.0, epsilon = 1e-9);
    assert_relative_eq!(r.mz, -60.0, epsilon = 1e-9);

    // Tip deflection PL³/3EI
    let ei = 200e6 * 2.772e-5;
    assert_relative_eq!(
        result.joint_displacements[&2].uy,
        10.0 * 216.0 / (3.0 * ei),
        max_relative = 1e-9
    );
}

#[test]
fn bar_end_load_matches_joint_load() {
    let build = |on_bar: bool| {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, material()).unwrap();
        model.add_section(1, section()).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::fixed()).unwrap();
        model.add_support(2, Support::roller_y()).unwrap();
        if on_bar {
            // Transverse load applied exactly at the j-end of the bar
            model
                .add_load(BarPointLoad::transverse(1, 10.0, 6.0))
                .unwrap();
        } else {
            model.add_load(JointLoad::downward(2, 10.0)).unwrap();
        }
        model.analyze(&AnalysisOptions::default()).unwrap()
    };

    let on_bar = build(true);
    let on_joint = build(false);
    for joint in [1_u32, 2] {
        assert_relative_eq!(
            on_bar.reactions[&joint].ry,
            on_joint.reactions[&joint].ry,
            epsilon = 1e-9
        );
    }
    assert_relative_eq!(
        on_bar.bar_fields[&1].m(1.5),
        on_joint.bar_fields[&1].m(1.5),
        epsilon = 1e-9
    );
}

#[test]
fn hypostatic_model_is_refused() {
    let mut model = Model::new();
    model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
    model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
    model.add_material(1, material()).unwrap();
    model.add_section(1, section()).unwrap();
    model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
    model.add_support(1, Support::roller_y()).unwrap();
    model.add_support(2, Support::roller_y()).unwrap();

    match model.analyze(&AnalysisOptions::default()) {
        Err(EngineError::Hypostatic { gh, deficit }) => {
            assert_eq!(gh, -1);
            assert_eq!(deficit, 1);
        }
        other => panic!("expected Hypostatic, got {other:?}"),
    }
}

#[test]
fn count_satisfied_mechanism_is_refused() {
    // Three collinear horizontal restraints: r = 3 but the vertical
    // rigid-body motion is free
    let mut model = Model::new();
    model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
    model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
    model.add_material(1, material()).unwrap();
    model.add_section(1, section()).unwrap();
    model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
    model.add_support(1, Support::guide_x()).unwrap();
    model.add_support(2, Support::roller_x()).unwrap();

    assert!(matches!(
        model.analyze(&AnalysisOptions::default()),
        Err(EngineError::Unstable(_))
    ));
}

#[test]
fn cancellation_returns_no_result() {
    let model = loaded_portal();
    let control = AnalysisControl::new();
    control.cancel();
    assert!(matches!(
        model.analyze_with_control(&AnalysisOptions::default(), &control),
        Err(EngineError::Canceled)
    ));
}

#[test]
fn progress_reaches_one() {
    let model = loaded_portal();
    let control = AnalysisControl::new();
    model
        .analyze_with_control(&AnalysisOptions::default(), &control)
        .unwrap();
    assert_eq!(control.progress(), 1.0);
}

#[test]
fn timoshenko_mode_softens_the_structure() {
    let build = |shear: bool| {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, section()).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::fixed()).unwrap();
        model.add_support(2, Support::spring_y(5000.0)).unwrap();
        model
            .add_load(BarPointLoad::transverse(1, 10.0, 3.0))
            .unwrap();
        let options = if shear {
            AnalysisOptions::timoshenko()
        } else {
            AnalysisOptions::default()
        };
        model.analyze(&options).unwrap()
    };

    let euler = build(false);
    let timo = build(true);
    // Shear flexibility changes the redundant, slightly
    assert!(euler.x[0] != timo.x[0]);
    assert!((euler.x[0] - timo.x[0]).abs() / euler.x[0].abs() < 1e-2);
}
