//! JSON scene import.
//!
//! ```json
//! { "atoms": [ { "element": "O", "x": 0.0, "y": 0.0, "z": 0.0 } ],
//!   "bonds": [ [0, 1], [0, 2, 2] ] }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::SceneError;
use crate::scene::{Atom, Bond, BondOrder, Scene};

const DEFAULT_ELEMENT: &str = "C";

#[derive(Debug, Deserialize)]
struct SceneDocument {
    #[serde(default)]
    atoms: Option<Vec<AtomRecord>>,
    #[serde(default)]
    bonds: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct AtomRecord {
    #[serde(default)]
    element: Option<String>,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default)]
    z: Option<f32>,
}

impl AtomRecord {
    fn into_atom(self) -> Atom {
        let element = self
            .element
            .filter(|element| !element.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ELEMENT.to_string());
        Atom::new(
            element.trim(),
            [
                self.x.unwrap_or(0.0),
                self.y.unwrap_or(0.0),
                self.z.unwrap_or(0.0),
            ],
        )
    }
}

pub fn load_from_file(path: &Path) -> Result<Scene, SceneError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scene(&contents)
}

/// Parses a JSON scene. Bonds pointing at atoms that do not exist are
/// dropped; bond entries that are not arrays of at least two elements are
/// skipped.
pub fn parse_scene(contents: &str) -> Result<Scene, SceneError> {
    let value: Value = serde_json::from_str(contents)?;
    if !value.is_object() {
        return Err(SceneError::Parse(
            "top-level value must be an object".to_string(),
        ));
    }
    let document: SceneDocument = serde_json::from_value(value)?;
    let atoms: Vec<Atom> = document
        .atoms
        .unwrap_or_default()
        .into_iter()
        .map(AtomRecord::into_atom)
        .collect();

    let mut bonds = Vec::new();
    for (index, entry) in document.bonds.unwrap_or_default().iter().enumerate() {
        let Some(fields) = entry.as_array() else {
            log::debug!("skipping bond entry {index}: not an array");
            continue;
        };
        if fields.len() < 2 {
            log::debug!("skipping bond entry {index}: fewer than two indices");
            continue;
        }
        let a = bond_field(&fields[0], index)?;
        let b = bond_field(&fields[1], index)?;
        let order = match fields.get(2) {
            Some(value) => BondOrder::from_raw(bond_field(value, index)?),
            None => BondOrder::Single,
        };
        match (usize::try_from(a), usize::try_from(b)) {
            (Ok(a), Ok(b)) => bonds.push(Bond::new(a, b, order)),
            _ => log::debug!("dropping bond entry {index}: negative index"),
        }
    }

    Ok(Scene::new(atoms, bonds))
}

fn bond_field(value: &Value, index: usize) -> Result<i64, SceneError> {
    if let Some(integer) = value.as_i64() {
        return Ok(integer);
    }
    value
        .as_f64()
        .filter(|float| float.is_finite())
        .map(|float| float.trunc() as i64)
        .ok_or_else(|| SceneError::Parse(format!("bond {index}: expected a number, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_atoms_and_bond_orders() {
        let scene = parse_scene(
            r#"{
                "atoms": [
                    {"element": "O", "x": 0.0, "y": 0.0, "z": 0.0},
                    {"element": "H", "x": 1.0, "y": 0.5},
                    {"x": -1.0}
                ],
                "bonds": [[0, 1], [0, 2, 2]]
            }"#,
        )
        .unwrap();
        assert_eq!(scene.atoms().len(), 3);
        assert_eq!(scene.atoms()[1].position.z, 0.0);
        assert_eq!(scene.atoms()[2].element, "C");
        assert_eq!(
            scene.bonds(),
            &[
                Bond::new(0, 1, BondOrder::Single),
                Bond::new(0, 2, BondOrder::Double)
            ]
        );
    }

    #[test]
    fn out_of_range_bond_is_dropped() {
        let scene = parse_scene(
            r#"{"atoms": [{"element": "N"}, {"element": "N", "x": 1.1}], "bonds": [[0, 5]]}"#,
        )
        .unwrap();
        assert_eq!(scene.atoms().len(), 2);
        assert!(scene.bonds().is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_scene("{not json").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }

    #[test]
    fn wrong_types_are_parse_errors() {
        assert!(matches!(
            parse_scene(r#"{"atoms": [{"x": "far"}]}"#),
            Err(SceneError::Parse(_))
        ));
        assert!(matches!(
            parse_scene(r#"{"atoms": [1, 2]}"#),
            Err(SceneError::Parse(_))
        ));
        assert!(matches!(
            parse_scene(r#"{"atoms": [{}, {}], "bonds": [["a", 1]]}"#),
            Err(SceneError::Parse(_))
        ));
        assert!(matches!(parse_scene("[]"), Err(SceneError::Parse(_))));
    }

    #[test]
    fn missing_sections_give_empty_scene() {
        let scene = parse_scene(r#"{"atoms": null}"#).unwrap();
        assert!(scene.is_empty());
        assert!(scene.bonds().is_empty());
    }

    #[test]
    fn odd_bond_entries() {
        let scene = parse_scene(
            r#"{
                "atoms": [{}, {"x": 1.0}, {"x": 2.0}],
                "bonds": [7, [0], [0, 1, 9], [1.0, 2.0], [-1, 0], [2, 2]]
            }"#,
        )
        .unwrap();
        assert_eq!(
            scene.bonds(),
            &[
                Bond::new(0, 1, BondOrder::Triple),
                Bond::new(1, 2, BondOrder::Single)
            ]
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SceneError::Read { .. }));
    }
}
