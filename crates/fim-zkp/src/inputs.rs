//! # Circuit Inputs
//!
//! Circom circuits take a JSON object whose values are either a single
//! field element or an array of field elements. [`CircuitInputs`] keeps the
//! two groups apart and preserves insertion order, which is the order the
//! witness generator sees them in.

use std::ops::Add;

use serde::ser::{Serialize, SerializeMap, Serializer};

use fim_core::FieldElement;

use crate::error::ZkpError;

/// Named scalar and array inputs for a circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitInputs {
    inputs: Option<Vec<(String, FieldElement)>>,
    array_inputs: Option<Vec<(String, Vec<FieldElement>)>>,
}

impl CircuitInputs {
    /// Create inputs. At least one group must be present.
    pub fn new(
        inputs: Option<Vec<(String, FieldElement)>>,
        array_inputs: Option<Vec<(String, Vec<FieldElement>)>>,
    ) -> Result<Self, ZkpError> {
        if inputs.is_none() && array_inputs.is_none() {
            return Err(ZkpError::Validation(
                "at least one input group must be provided".to_string(),
            ));
        }
        Ok(Self {
            inputs,
            array_inputs,
        })
    }

    /// Scalar inputs only.
    pub fn scalars(inputs: Vec<(String, FieldElement)>) -> Self {
        Self {
            inputs: Some(inputs),
            array_inputs: None,
        }
    }

    /// Array inputs only.
    pub fn arrays(array_inputs: Vec<(String, Vec<FieldElement>)>) -> Self {
        Self {
            inputs: None,
            array_inputs: Some(array_inputs),
        }
    }

    /// The scalar inputs, if the group is present.
    pub fn inputs(&self) -> Option<&[(String, FieldElement)]> {
        self.inputs.as_deref()
    }

    /// The array inputs, if the group is present.
    pub fn array_inputs(&self) -> Option<&[(String, Vec<FieldElement>)]> {
        self.array_inputs.as_deref()
    }

    /// The first scalar input named `name`.
    pub fn scalar(&self, name: &str) -> Option<&FieldElement> {
        self.inputs()?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The first array input named `name`.
    pub fn array(&self, name: &str) -> Option<&[FieldElement]> {
        self.array_inputs()?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Total number of scalars across both groups.
    pub fn number_of_inputs(&self) -> usize {
        self.inputs.as_ref().map_or(0, Vec::len)
            + self
                .array_inputs
                .as_ref()
                .map_or(0, |groups| groups.iter().map(|(_, v)| v.len()).sum())
    }

    /// The JSON object handed to the witness generator.
    pub fn to_json(&self) -> Result<serde_json::Value, ZkpError> {
        Ok(serde_json::to_value(self)?)
    }
}

fn concat<T>(a: Option<Vec<T>>, b: Option<Vec<T>>) -> Option<Vec<T>> {
    match (a, b) {
        (Some(mut a), Some(b)) => {
            a.extend(b);
            Some(a)
        }
        (a, None) => a,
        (None, b) => b,
    }
}

impl Add for CircuitInputs {
    type Output = CircuitInputs;

    fn add(self, rhs: CircuitInputs) -> CircuitInputs {
        CircuitInputs {
            inputs: concat(self.inputs, rhs.inputs),
            array_inputs: concat(self.array_inputs, rhs.array_inputs),
        }
    }
}

impl Serialize for CircuitInputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let scalars = self.inputs().unwrap_or_default();
        let arrays = self.array_inputs().unwrap_or_default();
        let mut map = serializer.serialize_map(Some(scalars.len() + arrays.len()))?;
        for (name, value) in scalars {
            map.serialize_entry(name, value)?;
        }
        for (name, values) in arrays {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_u64(v)
    }

    #[test]
    fn requires_a_group() {
        assert!(matches!(
            CircuitInputs::new(None, None),
            Err(ZkpError::Validation(_))
        ));
        assert!(CircuitInputs::new(Some(vec![]), None).is_ok());
    }

    #[test]
    fn number_of_inputs_counts_array_members() {
        let inputs = CircuitInputs::new(
            Some(vec![("a".into(), fe(1))]),
            Some(vec![("b".into(), vec![fe(2), fe(3)]), ("c".into(), vec![fe(4)])]),
        )
        .unwrap();
        assert_eq!(inputs.number_of_inputs(), 4);
    }

    #[test]
    fn addition_concatenates_groups() {
        let a = CircuitInputs::scalars(vec![("a".into(), fe(1))]);
        let b = CircuitInputs::arrays(vec![("b".into(), vec![fe(2)])]);
        let c = CircuitInputs::scalars(vec![("c".into(), fe(3))]);
        let sum = a + b + c;
        assert_eq!(sum.inputs().unwrap().len(), 2);
        assert_eq!(sum.array("b"), Some(&[fe(2)][..]));
        assert_eq!(sum.scalar("c"), Some(&fe(3)));
        assert_eq!(sum.number_of_inputs(), 3);
    }

    #[test]
    fn json_is_a_flat_object() {
        let inputs = CircuitInputs::new(
            Some(vec![("x".into(), fe(7))]),
            Some(vec![("timeframe".into(), vec![fe(1), fe(2)])]),
        )
        .unwrap();
        assert_eq!(
            inputs.to_json().unwrap(),
            serde_json::json!({ "x": "7", "timeframe": ["1", "2"] })
        );
    }
}
