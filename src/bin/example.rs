//! Example - portal frame under wind load

use anyhow::Context;
use flex_solver::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== flex-solver example: portal frame ===\n");

    let mut model = Model::new();

    // Materials and section (IPE-ish welded profile)
    model.add_material(1, Material::steel())?;
    model.add_section(1, Section::new(5.38e-3, 2.772e-5).with_depth(0.27))?;

    // Portal geometry, Y positive downward:
    //
    //     J3 ---------- J4        beam 6 m
    //     |             |
    //     |             |         columns 4 m
    //     J1            J2
    //    =====         =====     fixed bases
    //
    model.add_joint(1, Joint::new(0.0, 4.0))?;
    model.add_joint(2, Joint::new(6.0, 4.0))?;
    model.add_joint(3, Joint::new(0.0, 0.0))?;
    model.add_joint(4, Joint::new(6.0, 0.0))?;

    model.add_bar(1, Bar::new(1, 3, 1, 1))?; // left column
    model.add_bar(2, Bar::new(2, 4, 1, 1))?; // right column
    model.add_bar(3, Bar::new(3, 4, 1, 1))?; // beam

    model.add_support(1, Support::fixed())?;
    model.add_support(2, Support::fixed())?;

    // 20 kN of wind pushing the top-left knee to the right
    model.add_load(JointLoad::horizontal(3, 20.0))?;

    let gh = degree(&model).gh;
    println!("degree of static indeterminacy: {gh}");

    let result = model
        .analyze(&AnalysisOptions::default())
        .context("portal frame analysis failed")?;

    println!("\nredundants:");
    for (r, x) in result.redundants.iter().zip(&result.x) {
        println!("  {r:?} = {x:+.4}");
    }

    println!("\nbase reactions (forces on the structure):");
    for (joint, r) in &result.reactions {
        println!(
            "  joint {joint}: Rx = {:+.3} kN, Ry = {:+.3} kN, Mz = {:+.3} kNm",
            r.rx, r.ry, r.mz
        );
    }

    println!("\nbeam bending moments:");
    let beam = &result.bar_fields[&3];
    for x in [0.0, 1.5, 3.0, 4.5, 6.0] {
        println!("  M({x:.1}) = {:+.4} kNm", beam.m(x));
    }

    println!("\nknee sway:");
    let d = &result.joint_displacements[&3];
    println!("  ux = {:+.6} m, uy = {:+.6} m, rz = {:+.6} rad", d.ux, d.uy, d.rz);

    let diag = &result.diagnostics;
    println!(
        "\ncond(F) = {:.3e}, residual = {:.3e}, equilibrium = {:?}",
        diag.condition_number, diag.residual_norm, diag.equilibrium
    );

    Ok(())
}
