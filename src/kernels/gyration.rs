//! Radius of gyration
use std::collections::BTreeMap;

use super::error::KernelError;
use crate::dump::AtomRecord;

/// Radius of gyration of a group of atoms.
///
/// The centre is mass weighted; the deviation is not. The sum of squared
/// per-axis deviations is divided by `3 * atoms.len()`, which gives an
/// unweighted isotropic radius.
pub fn radius_of_gyration(
    atoms: &[AtomRecord],
    masses: &BTreeMap<String, f64>,
) -> Result<f64, KernelError> {
    let mut center = [0.0; 3];
    let mut total_mass = 0.0;
    for atom in atoms {
        let species = atom.species.as_deref().unwrap_or_default();
        let mass = masses
            .get(species)
            .copied()
            .ok_or_else(|| KernelError::MissingMass {
                species: species.to_string(),
            })?;
        total_mass += mass;
        for axis in 0..3 {
            center[axis] += atom.position[axis] * mass;
        }
    }
    for c in &mut center {
        *c /= total_mass;
    }

    let mut sum = 0.0;
    for atom in atoms {
        for axis in 0..3 {
            let d = atom.position[axis] - center[axis];
            sum += d * d;
        }
    }
    Ok((sum / (atoms.len() * 3) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::Vec3;

    fn at(species: &str, position: Vec3) -> AtomRecord {
        AtomRecord {
            position,
            species: Some(species.to_string()),
            molecule: None,
        }
    }

    #[test]
    fn test_two_unit_masses() {
        let masses = BTreeMap::from([("C".to_string(), 1.0)]);
        let atoms = [at("C", [-1.0, 0.0, 0.0]), at("C", [1.0, 0.0, 0.0])];
        let radius = radius_of_gyration(&atoms, &masses).unwrap();
        assert!((radius - (1.0f64 / 3.0).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_center_is_mass_weighted() {
        let masses = BTreeMap::from([("H".to_string(), 1.0), ("O".to_string(), 3.0)]);
        let atoms = [at("O", [0.0, 0.0, 0.0]), at("H", [4.0, 0.0, 0.0])];
        // Centre at x = 1: deviations 1 and 3.
        let radius = radius_of_gyration(&atoms, &masses).unwrap();
        assert!((radius - (10.0f64 / 6.0).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_missing_mass() {
        let masses = BTreeMap::from([("C".to_string(), 12.0)]);
        let atoms = [at("C", [0.0; 3]), at("N", [1.0; 3])];
        let err = radius_of_gyration(&atoms, &masses).unwrap_err();
        assert!(matches!(err, KernelError::MissingMass { species } if species == "N"));
    }
}
