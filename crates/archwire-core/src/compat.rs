//! Port compatibility checking.
//!
//! [`check_port_compatibility`] decides whether an output-capable port may
//! feed an input-capable port. The direction gate always runs first; a
//! role-swapped pair never reaches the type check. Type matching is
//! recursive over generics and bounded by [`MAX_TYPE_DEPTH`], so it always
//! terminates.

use serde::{Deserialize, Serialize};

use crate::port::{PortDefinition, TypeReference, MAX_TYPE_DEPTH};

/// Penalty per generic argument the input side leaves defaulted.
const GENERIC_DEFAULT_PENALTY: u32 = 10;
/// Penalty for widening a non-null output into a nullable input.
const NULLABILITY_PENALTY: u32 = 5;

/// How strictly types must line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// Identical target, identical generic list, identical nullability.
    Strict,
    /// Also accepts fewer/defaulted generics on the input side and
    /// non-null → nullable widening.
    Compatible,
}

/// Outcome of a compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    /// Whether the ports may be connected.
    pub compatible: bool,
    /// Human-readable reason when incompatible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Remediation hints when incompatible.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Candidate-ranking score in [0, 100]; only assigned in
    /// [`CheckMode::Compatible`]. Ranks matches, never gates them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl Compatibility {
    fn pass(score: Option<u8>) -> Self {
        Self {
            compatible: true,
            reason: None,
            suggestions: Vec::new(),
            score,
        }
    }

    fn fail(reason: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            compatible: false,
            reason: Some(reason.into()),
            suggestions,
            score: None,
        }
    }

    /// Whether this is an exact, relaxation-free match.
    pub fn is_exact(&self) -> bool {
        self.compatible && self.score.map(|s| s == 100).unwrap_or(true)
    }
}

struct Mismatch {
    reason: String,
    suggestions: Vec<String>,
}

impl Mismatch {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            suggestions: Vec::new(),
        }
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Decide whether `output` may feed `input`.
pub fn check_port_compatibility(
    output: &PortDefinition,
    input: &PortDefinition,
    mode: CheckMode,
) -> Compatibility {
    if !output.direction.is_output_capable() {
        return Compatibility::fail(
            format!(
                "port `{}` has direction `{}` and cannot act as a source",
                output.name, output.direction
            ),
            vec![format!(
                "use an `out` or `inout` port as the source instead of `{}`",
                output.name
            )],
        );
    }
    if !input.direction.is_input_capable() {
        return Compatibility::fail(
            format!(
                "port `{}` has direction `{}` and cannot act as a target",
                input.name, input.direction
            ),
            vec![format!(
                "use an `in` or `inout` port as the target instead of `{}`",
                input.name
            )],
        );
    }

    match match_types(&output.ty, &input.ty, mode, 1) {
        Ok(penalty) => {
            let score = match mode {
                CheckMode::Strict => None,
                CheckMode::Compatible => Some(100u32.saturating_sub(penalty).min(100) as u8),
            };
            Compatibility::pass(score)
        }
        Err(mismatch) => Compatibility::fail(mismatch.reason, mismatch.suggestions),
    }
}

fn match_types(
    out_ty: &TypeReference,
    in_ty: &TypeReference,
    mode: CheckMode,
    depth: usize,
) -> Result<u32, Mismatch> {
    if depth > MAX_TYPE_DEPTH {
        return Err(Mismatch::new(format!(
            "type comparison exceeded the maximum nesting depth of {MAX_TYPE_DEPTH}"
        )));
    }

    if out_ty.target != in_ty.target {
        return Err(Mismatch::new(format!(
            "output type `{}` does not match input type `{}`",
            out_ty.target, in_ty.target
        ))
        .suggest(format!("change the input port type to `{}`", out_ty.target)));
    }

    let mut penalty = 0u32;

    match (out_ty.nullable, in_ty.nullable) {
        (true, false) => {
            return Err(Mismatch::new(format!(
                "output `{}` is nullable but the input does not tolerate null",
                out_ty.target
            ))
            .suggest("mark the input port type nullable".to_string()));
        }
        (false, true) => match mode {
            CheckMode::Strict => {
                return Err(Mismatch::new(format!(
                    "nullability differs on `{}` (strict mode requires identical types)",
                    out_ty.target
                )));
            }
            CheckMode::Compatible => penalty += NULLABILITY_PENALTY,
        },
        _ => {}
    }

    let out_generics = out_ty.generics.len();
    let in_generics = in_ty.generics.len();
    if out_generics == in_generics {
        for (out_generic, in_generic) in out_ty.generics.iter().zip(&in_ty.generics) {
            penalty += match_types(out_generic, in_generic, mode, depth + 1)?;
        }
    } else if mode == CheckMode::Compatible && in_generics < out_generics {
        // The input leaves trailing generics defaulted.
        for (out_generic, in_generic) in out_ty.generics.iter().zip(&in_ty.generics) {
            penalty += match_types(out_generic, in_generic, mode, depth + 1)?;
        }
        penalty += GENERIC_DEFAULT_PENALTY * (out_generics - in_generics) as u32;
    } else {
        return Err(Mismatch::new(format!(
            "generic arity differs on `{}`: output has {}, input has {}",
            out_ty.target, out_generics, in_generics
        ))
        .suggest(format!(
            "declare the input port with {out_generics} generic argument(s)"
        )));
    }

    Ok(penalty)
}
