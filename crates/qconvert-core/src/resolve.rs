//! Export metadata resolution and the replacement chain.

use std::sync::Arc;

use qconvert_expr::{Bindings, Evaluator};
use qconvert_ir::{ExportInfo, ExportTarget, GateDef, GateTable};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};
use crate::event::GateEvent;

/// A gate after following every replacement for one export target.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGate {
    /// Name of the definition finally emitted.
    pub name: String,
    /// That definition.
    pub definition: Arc<GateDef>,
    /// Its export entry.
    pub export: ExportInfo,
    /// Target the export entry was found under.
    pub target: ExportTarget,
    /// Parameters, by name.
    pub params: Bindings,
}

/// Resolve the export entry of `gate` for `target`.
///
/// Replacement entries are followed until a definition without one is
/// reached. Replacement parameters are closed-form formulas and are
/// evaluated without bindings.
pub fn resolve_export(
    gate: &GateEvent,
    target: ExportTarget,
    table: &GateTable,
    evaluator: &Evaluator,
) -> ConvertResult<ResolvedGate> {
    let mut definition = gate
        .definition
        .clone()
        .ok_or_else(|| ConvertError::Lookup(format!("Definition not found for gate \"{}\"", gate.name)))?;
    let mut name = gate.name.clone();
    let mut params = gate.bound.clone();
    let mut visited = FxHashSet::default();
    visited.insert(name.clone());

    loop {
        let (found, export) = definition.export_for(target).ok_or_else(|| {
            ConvertError::Lookup(format!("No {target} export info for gate \"{name}\""))
        })?;

        let Some(replacement) = &export.replacement else {
            return Ok(ResolvedGate {
                name,
                export: export.clone(),
                target: found,
                definition,
                params,
            });
        };

        if !visited.insert(replacement.name.clone()) {
            return Err(ConvertError::ReplacementCycle {
                gate: gate.name.clone(),
                reason: format!("\"{}\" is replaced more than once", replacement.name),
            });
        }
        let next = table.get(&replacement.name).cloned().ok_or_else(|| {
            ConvertError::ReplacementCycle {
                gate: gate.name.clone(),
                reason: format!("replacement \"{}\" is not defined", replacement.name),
            }
        })?;

        let mut replaced = Bindings::new();
        for (param, formula) in &replacement.params {
            let value = evaluator
                .evaluate_constant(formula)
                .map_err(|error| ConvertError::Evaluation {
                    gate: replacement.name.clone(),
                    error,
                })?;
            replaced.insert(param, value);
        }
        if replaced.len() != next.params.len() {
            return Err(ConvertError::ParameterCount {
                gate: replacement.name.clone(),
                expected: next.params.len(),
                got: replaced.len(),
            });
        }

        debug!(from = %name, to = %replacement.name, via = %found, "replacing gate");
        name = replacement.name.clone();
        definition = next;
        params = replaced;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qconvert_expr::Value;
    use std::f64::consts::PI;

    fn event(table: &GateTable, name: &str) -> GateEvent {
        GateEvent {
            name: name.into(),
            definition: table.get(name).cloned(),
            matrix: None,
            params: vec![],
            bound: Bindings::new(),
            qubits: vec![0],
            condition: None,
        }
    }

    #[test]
    fn test_direct_export() {
        let table = GateTable::builtin().unwrap();
        let resolved =
            resolve_export(&event(&table, "h"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap();
        assert_eq!(resolved.name, "h");
        assert_eq!(resolved.export.name.as_deref(), Some("H"));
        assert_eq!(resolved.target, ExportTarget::Pyquil);
    }

    #[test]
    fn test_replacement_through_fallback() {
        let table = GateTable::builtin().unwrap();
        let resolved =
            resolve_export(&event(&table, "r8"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap();
        assert_eq!(resolved.name, "u1");
        assert_eq!(resolved.export.name.as_deref(), Some("PHASE"));
        assert!(resolved.params.get("lambda").unwrap().approx_eq(Value::Real(PI / 8.0), 1e-15));
    }

    #[test]
    fn test_missing_definition() {
        let table = GateTable::builtin().unwrap();
        let err =
            resolve_export(&event(&table, "nope"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap_err();
        assert!(matches!(err, ConvertError::Lookup(_)));
    }

    #[test]
    fn test_missing_export_info() {
        let table = GateTable::from_json_str(r#"{"version": "t", "gates": {"g": {}}}"#).unwrap();
        let err =
            resolve_export(&event(&table, "g"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap_err();
        assert!(matches!(err, ConvertError::Lookup(ref m) if m.contains("pyquil")));
    }

    #[test]
    fn test_cycle_detected() {
        let json = r#"{"version": "t", "gates": {
            "a": {"exportInfo": {"quil": {"replacement": {"name": "b"}}}},
            "b": {"exportInfo": {"pyquil": {"replacement": {"name": "a"}}}}
        }}"#;
        let table = GateTable::from_json_str(json).unwrap();
        let err =
            resolve_export(&event(&table, "a"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap_err();
        assert!(matches!(err, ConvertError::ReplacementCycle { ref gate, .. } if gate == "a"));
    }

    #[test]
    fn test_self_replacement_is_a_cycle() {
        let json = r#"{"version": "t", "gates": {
            "a": {"exportInfo": {"quil": {"replacement": {"name": "a"}}}}
        }}"#;
        let table = GateTable::from_json_str(json).unwrap();
        let err =
            resolve_export(&event(&table, "a"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap_err();
        assert!(matches!(err, ConvertError::ReplacementCycle { .. }));
    }

    #[test]
    fn test_dangling_replacement() {
        let json = r#"{"version": "t", "gates": {
            "a": {"exportInfo": {"quil": {"replacement": {"name": "ghost"}}}}
        }}"#;
        let table = GateTable::from_json_str(json).unwrap();
        let err =
            resolve_export(&event(&table, "a"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap_err();
        assert!(
            matches!(err, ConvertError::ReplacementCycle { ref reason, .. } if reason.contains("ghost"))
        );
    }

    #[test]
    fn test_replacement_missing_parameter() {
        let json = r#"{"version": "t", "gates": {
            "a": {"exportInfo": {"quil": {"replacement": {"name": "p"}}}},
            "p": {"params": ["lambda"], "exportInfo": {"quil": {"name": "PHASE", "params": ["lambda"]}}}
        }}"#;
        let table = GateTable::from_json_str(json).unwrap();
        let err =
            resolve_export(&event(&table, "a"), ExportTarget::Pyquil, &table, &Evaluator::new())
                .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::ParameterCount {
                expected: 1,
                got: 0,
                ..
            }
        ));
    }
}
