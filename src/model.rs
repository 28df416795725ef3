//! Structural model - the owning container for all entities
//!
//! Joints, materials, sections, bars, supports and loads live in id-keyed
//! ordered maps; every cross-reference is a stable integer id resolved
//! through these tables. Analysis borrows the model immutably and returns
//! a self-contained result object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{self, AnalysisControl, AnalysisOptions};
use crate::elements::{Bar, BarGeometry, Dof, Joint, Material, Section, Support, MIN_LENGTH};
use crate::error::{EngineError, EngineResult};
use crate::loads::Load;
use crate::results::AnalysisResult;

/// The planar frame model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    /// Joints keyed by id
    pub joints: BTreeMap<u32, Joint>,
    /// Materials keyed by id
    pub materials: BTreeMap<u32, Material>,
    /// Sections keyed by id
    pub sections: BTreeMap<u32, Section>,
    /// Bars keyed by id
    pub bars: BTreeMap<u32, Bar>,
    /// Supports keyed by joint id
    pub supports: BTreeMap<u32, Support>,
    /// The load case
    pub loads: std::vec::Vec<Load>,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model building
    // ========================

    /// Add a joint
    pub fn add_joint(&mut self, id: u32, joint: Joint) -> EngineResult<()> {
        if !joint.x.is_finite() || !joint.y.is_finite() {
            return Err(EngineError::ModelInvalid(format!(
                "joint {id} has non-finite coordinates"
            )));
        }
        if self.joints.contains_key(&id) {
            return Err(EngineError::DuplicateId(id));
        }
        self.joints.insert(id, joint);
        Ok(())
    }

    /// Add a material
    pub fn add_material(&mut self, id: u32, material: Material) -> EngineResult<()> {
        if material.e <= 0.0 {
            return Err(EngineError::ModelInvalid(format!(
                "material {id} has non-positive E"
            )));
        }
        if material.alpha < 0.0 {
            return Err(EngineError::ModelInvalid(format!(
                "material {id} has negative thermal coefficient"
            )));
        }
        if self.materials.contains_key(&id) {
            return Err(EngineError::DuplicateId(id));
        }
        self.materials.insert(id, material);
        Ok(())
    }

    /// Add a section
    pub fn add_section(&mut self, id: u32, section: Section) -> EngineResult<()> {
        if section.a <= 0.0 || section.i_z <= 0.0 {
            return Err(EngineError::ModelInvalid(format!(
                "section {id} has non-positive A or I_z"
            )));
        }
        if self.sections.contains_key(&id) {
            return Err(EngineError::DuplicateId(id));
        }
        self.sections.insert(id, section);
        Ok(())
    }

    /// Add a bar
    pub fn add_bar(&mut self, id: u32, bar: Bar) -> EngineResult<()> {
        let i = self
            .joints
            .get(&bar.i_joint)
            .ok_or(EngineError::JointNotFound(bar.i_joint))?;
        let j = self
            .joints
            .get(&bar.j_joint)
            .ok_or(EngineError::JointNotFound(bar.j_joint))?;
        if bar.i_joint == bar.j_joint {
            return Err(EngineError::ModelInvalid(format!(
                "bar {id} connects joint {} to itself",
                bar.i_joint
            )));
        }
        if i.distance_to(j) < MIN_LENGTH {
            return Err(EngineError::ModelInvalid(format!(
                "bar {id} has zero length (below {MIN_LENGTH:e} m)"
            )));
        }
        if !self.materials.contains_key(&bar.material) {
            return Err(EngineError::MaterialNotFound(bar.material));
        }
        if !self.sections.contains_key(&bar.section) {
            return Err(EngineError::SectionNotFound(bar.section));
        }
        if self.bars.contains_key(&id) {
            return Err(EngineError::DuplicateId(id));
        }
        self.bars.insert(id, bar);
        Ok(())
    }

    /// Assign a support to a joint
    pub fn add_support(&mut self, joint: u32, support: Support) -> EngineResult<()> {
        if !self.joints.contains_key(&joint) {
            return Err(EngineError::JointNotFound(joint));
        }
        if let Support::Elastic { kx, ky, kt } = support {
            if kx < 0.0 || ky < 0.0 || kt < 0.0 {
                return Err(EngineError::ModelInvalid(format!(
                    "elastic support at joint {joint} has a negative constant"
                )));
            }
            if kx == 0.0 && ky == 0.0 && kt == 0.0 {
                return Err(EngineError::ModelInvalid(format!(
                    "elastic support at joint {joint} has no positive constant"
                )));
            }
        }
        self.supports.insert(joint, support);
        Ok(())
    }

    /// Add a load to the load case
    pub fn add_load<L: Into<Load>>(&mut self, load: L) -> EngineResult<()> {
        let load = load.into();
        self.check_load(&load)?;
        self.loads.push(load);
        Ok(())
    }

    fn check_load(&self, load: &Load) -> EngineResult<()> {
        if let Some(bar_id) = load.bar() {
            let bar = self.bars.get(&bar_id).ok_or(EngineError::BarNotFound(bar_id))?;
            let length = self.geometry(bar_id)?.length;
            match load {
                Load::BarPoint(l) => {
                    if l.a < 0.0 || l.a > length {
                        return Err(EngineError::ModelInvalid(format!(
                            "point load at {} m lies outside bar {bar_id} (L = {length} m)",
                            l.a
                        )));
                    }
                }
                Load::BarDistributed(l) => {
                    let x2 = l.x2.min(length);
                    if l.x1 < 0.0 || l.x1 >= x2 || x2 > length {
                        return Err(EngineError::ModelInvalid(format!(
                            "distributed load extents [{}, {}] invalid on bar {bar_id}",
                            l.x1, l.x2
                        )));
                    }
                }
                Load::BarThermal(l) => {
                    if l.dt_gradient != 0.0 {
                        let section = &self.sections[&bar.section];
                        if section.h.is_none() {
                            return Err(EngineError::ModelInvalid(format!(
                                "thermal gradient on bar {bar_id} needs a section depth h"
                            )));
                        }
                    }
                }
                _ => {}
            }
        }
        if let Some(joint_id) = load.joint() {
            if !self.joints.contains_key(&joint_id) {
                return Err(EngineError::JointNotFound(joint_id));
            }
            if let Load::Imposed(l) = load {
                let support = self.supports.get(&joint_id).ok_or_else(|| {
                    EngineError::ModelInvalid(format!(
                        "imposed displacement at unsupported joint {joint_id}"
                    ))
                })?;
                for dof in Dof::ALL {
                    if l.component(dof) != 0.0 && !support.restrains(dof) {
                        return Err(EngineError::ModelInvalid(format!(
                            "imposed displacement at joint {joint_id} on free direction {dof:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    // ========================
    // Lookups
    // ========================

    /// Get a joint by id
    pub fn joint(&self, id: u32) -> EngineResult<&Joint> {
        self.joints.get(&id).ok_or(EngineError::JointNotFound(id))
    }

    /// Get a bar by id
    pub fn bar(&self, id: u32) -> EngineResult<&Bar> {
        self.bars.get(&id).ok_or(EngineError::BarNotFound(id))
    }

    /// Resolved geometry of a bar
    pub fn geometry(&self, bar_id: u32) -> EngineResult<BarGeometry> {
        let bar = self.bar(bar_id)?;
        Ok(BarGeometry::from_joints(
            self.joint(bar.i_joint)?,
            self.joint(bar.j_joint)?,
        ))
    }

    /// Material of a bar
    pub fn material_of(&self, bar_id: u32) -> EngineResult<&Material> {
        let bar = self.bar(bar_id)?;
        self.materials
            .get(&bar.material)
            .ok_or(EngineError::MaterialNotFound(bar.material))
    }

    /// Section of a bar
    pub fn section_of(&self, bar_id: u32) -> EngineResult<&Section> {
        let bar = self.bar(bar_id)?;
        self.sections
            .get(&bar.section)
            .ok_or(EngineError::SectionNotFound(bar.section))
    }

    /// Count of externally restrained DOFs (elastic k > 0 counts)
    pub fn restrained_dof_count(&self) -> usize {
        self.supports.values().map(Support::num_restrained).sum()
    }

    /// Count of internal end hinges over all bars
    pub fn hinge_count(&self) -> usize {
        self.bars.values().map(Bar::hinge_count).sum()
    }

    /// The imposed-displacement loads of the load case
    pub fn imposed_displacements(&self) -> impl Iterator<Item = &crate::loads::ImposedDisplacement> {
        self.loads.iter().filter_map(|l| match l {
            Load::Imposed(d) => Some(d),
            _ => None,
        })
    }

    // ========================
    // Validation & analysis
    // ========================

    /// Full validation pass, run before any analysis
    pub fn validate(&self) -> EngineResult<()> {
        if self.joints.is_empty() || self.bars.is_empty() {
            return Err(EngineError::ModelInvalid(
                "model needs at least one bar between two joints".into(),
            ));
        }
        for (&id, bar) in &self.bars {
            self.joint(bar.i_joint)?;
            self.joint(bar.j_joint)?;
            if self.geometry(id)?.length < MIN_LENGTH {
                return Err(EngineError::ModelInvalid(format!(
                    "bar {id} has zero length"
                )));
            }
        }
        for load in &self.loads {
            self.check_load(load)?;
        }
        if self.supports.is_empty() {
            return Err(EngineError::ModelInvalid("model has no supports".into()));
        }
        for &joint in self.supports.keys() {
            self.joint(joint)?;
        }
        Ok(())
    }

    /// Run the force-method analysis with the given options
    pub fn analyze(&self, options: &AnalysisOptions) -> EngineResult<AnalysisResult> {
        analysis::analyze(self, options)
    }

    /// Run the analysis with cooperative cancellation and progress
    pub fn analyze_with_control(
        &self,
        options: &AnalysisOptions,
        control: &AnalysisControl,
    ) -> EngineResult<AnalysisResult> {
        analysis::analyze_with_control(self, options, control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::BarPointLoad;

    fn two_joint_model() -> Model {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
        model
    }

    #[test]
    fn test_duplicate_joint_rejected() {
        let mut model = two_joint_model();
        assert!(matches!(
            model.add_joint(1, Joint::new(1.0, 1.0)),
            Err(EngineError::DuplicateId(1))
        ));
    }

    #[test]
    fn test_zero_length_bar_rejected() {
        let mut model = two_joint_model();
        model.add_joint(3, Joint::new(0.0, 0.0)).unwrap();
        assert!(model.add_bar(1, Bar::new(1, 3, 1, 1)).is_err());
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let mut model = two_joint_model();
        assert!(matches!(
            model.add_bar(1, Bar::new(1, 9, 1, 1)),
            Err(EngineError::JointNotFound(9))
        ));
    }

    #[test]
    fn test_point_load_outside_bar_rejected() {
        let mut model = two_joint_model();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        assert!(model.add_load(BarPointLoad::transverse(1, 10.0, 7.0)).is_err());
    }

    #[test]
    fn test_elastic_support_needs_positive_constant() {
        let mut model = two_joint_model();
        assert!(model.add_support(1, Support::elastic(0.0, 0.0, 0.0)).is_err());
        assert!(model.add_support(1, Support::elastic(0.0, -1.0, 0.0)).is_err());
        assert!(model.add_support(1, Support::spring_y(5000.0)).is_ok());
    }
}
