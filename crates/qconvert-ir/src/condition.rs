//! Classical conditions declared by `bfunc` instructions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::creg::ClassicalRegisterLayout;
use crate::error::{IrError, IrResult};

/// A declared comparison of one register against a constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Mask over global memory (equal to the register's full mask).
    pub mask: u128,
    /// Comparison value over global memory, as declared.
    pub val: u128,
    /// Memory offset of the register.
    pub memory: u32,
    /// Relation, e.g. `"=="`. `None` when the instruction omits it.
    pub relation: Option<String>,
    /// Register name.
    pub creg_name: String,
    /// Comparison value relative to the register (`val >> memory`).
    pub creg_value: u128,
}

impl Condition {
    /// Decode a condition from its textual mask and value.
    ///
    /// The mask must equal exactly one register's full mask.
    pub fn decode(
        mask: &str,
        val: &str,
        relation: Option<&str>,
        layout: &ClassicalRegisterLayout,
    ) -> IrResult<Self> {
        let mask = parse_radix_int(mask)?;
        let val = parse_radix_int(val)?;
        let register = layout.find_by_mask(mask)?;

        Ok(Self {
            mask,
            val,
            memory: register.offset,
            relation: relation.map(str::to_string),
            creg_name: register.name.clone(),
            creg_value: val.checked_shr(register.offset).unwrap_or(0),
        })
    }
}

/// Conditions of one experiment, keyed by declared identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTable {
    conditions: FxHashMap<u64, Condition>,
}

impl ConditionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or redeclare) a condition.
    pub fn declare(&mut self, id: u64, condition: Condition) {
        self.conditions.insert(id, condition);
    }

    /// Look up a declared condition.
    pub fn get(&self, id: u64) -> IrResult<&Condition> {
        self.conditions
            .get(&id)
            .ok_or(IrError::UnknownCondition(id))
    }

    /// Number of declared conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether no condition has been declared.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Parse an integer with an optional `0x`, `0o` or `0b` prefix.
///
/// Unprefixed input is decimal. Underscores between digits are accepted.
pub fn parse_radix_int(text: &str) -> IrResult<u128> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return Err(IrError::InvalidInteger(text.to_string()));
    }
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    u128::from_str_radix(&digits, radix).map_err(|_| IrError::InvalidInteger(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qobj::ExperimentHeader;

    fn layout() -> ClassicalRegisterLayout {
        ClassicalRegisterLayout::build(&ExperimentHeader {
            n_qubits: 3,
            memory_slots: 3,
            creg_sizes: vec![("c0".into(), 1), ("c1".into(), 2)],
        })
        .unwrap()
    }

    #[test]
    fn test_parse_radix_int() {
        assert_eq!(parse_radix_int("0x1F").unwrap(), 31);
        assert_eq!(parse_radix_int("0b101").unwrap(), 5);
        assert_eq!(parse_radix_int("0o17").unwrap(), 15);
        assert_eq!(parse_radix_int("42").unwrap(), 42);
        assert_eq!(parse_radix_int("1_000").unwrap(), 1000);
        assert!(parse_radix_int("0x").is_err());
        assert!(parse_radix_int("zz").is_err());
        assert!(parse_radix_int("-1").is_err());
    }

    #[test]
    fn test_decode_shifts_value() {
        let cond = Condition::decode("0x6", "0x4", Some("=="), &layout()).unwrap();
        assert_eq!(cond.creg_name, "c1");
        assert_eq!(cond.memory, 1);
        assert_eq!(cond.val, 4);
        assert_eq!(cond.creg_value, 2);
        assert_eq!(cond.relation.as_deref(), Some("=="));
    }

    #[test]
    fn test_decode_partial_mask_fails() {
        let err = Condition::decode("0x2", "0x2", None, &layout()).unwrap_err();
        assert!(matches!(err, IrError::MaskNotFound { mask: 2 }));
    }

    #[test]
    fn test_table_lookup() {
        let mut table = ConditionTable::new();
        assert!(matches!(table.get(7), Err(IrError::UnknownCondition(7))));
        table.declare(7, Condition::decode("0x1", "0x1", None, &layout()).unwrap());
        assert_eq!(table.get(7).unwrap().creg_name, "c0");
        assert_eq!(table.len(), 1);
    }
}
