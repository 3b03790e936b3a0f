//! Compatibility of a type reference change at a given position.
//!
//! Wrappers are peeled outermost first. Each step contributes a severity and
//! the result is the most severe step:
//!
//! | step                          | output      | input    |
//! |-------------------------------|-------------|----------|
//! | `T!` to `T` (relax)           | DANGEROUS   | SAFE     |
//! | `T` to `T!` (tighten)         | BREAKING    | BREAKING |
//! | list depth differs            | BREAKING    | BREAKING |
//! | named type replaced           | BREAKING *  | BREAKING |
//!
//! (*) DANGEROUS in output position when the new named type is a union or
//! interface the old named type is still a possible type of.

use crate::change::Severity;
use crate::errors::{CompareError, Side};
use crate::types::{Position, TypeGraph, TypeRef};

/// Resolves type-reference changes between an old and a new graph.
pub struct VarianceResolver<'a> {
    old: &'a TypeGraph,
    new: &'a TypeGraph,
}

impl<'a> VarianceResolver<'a> {
    pub fn new(old: &'a TypeGraph, new: &'a TypeGraph) -> Self {
        Self { old, new }
    }

    /// Severity of replacing `old_ty` with `new_ty` at `position`, or `None`
    /// when the references are identical.
    ///
    /// Fails when either reference does not resolve inside its own graph.
    pub fn classify(
        &self,
        path: &str,
        old_ty: &TypeRef,
        new_ty: &TypeRef,
        position: Position,
    ) -> Result<Option<Severity>, CompareError> {
        self.old
            .resolve(old_ty.named_type(), path)
            .map_err(CompareError::integrity(Side::Old))?;
        self.new
            .resolve(new_ty.named_type(), path)
            .map_err(CompareError::integrity(Side::New))?;

        if old_ty == new_ty {
            return Ok(None);
        }
        Ok(Some(self.walk(old_ty, new_ty, position)))
    }

    /// Whether replacing `old_ty` with `new_ty` at `position` is not breaking.
    pub fn is_safe_widening(
        &self,
        path: &str,
        old_ty: &TypeRef,
        new_ty: &TypeRef,
        position: Position,
    ) -> Result<bool, CompareError> {
        let severity = self.classify(path, old_ty, new_ty, position)?;
        Ok(severity != Some(Severity::Breaking))
    }

    fn walk(&self, old_ty: &TypeRef, new_ty: &TypeRef, position: Position) -> Severity {
        match (old_ty, new_ty) {
            (TypeRef::NonNull(old_inner), TypeRef::NonNull(new_inner)) => self.walk(old_inner, new_inner, position),
            (TypeRef::NonNull(old_inner), _) => {
                let relaxed = match position {
                    Position::Output => Severity::Dangerous,
                    Position::Input => Severity::Safe,
                };
                relaxed.escalate(self.walk(old_inner, new_ty, position))
            }
            (_, TypeRef::NonNull(_)) => Severity::Breaking,
            (TypeRef::List(old_inner), TypeRef::List(new_inner)) => self.walk(old_inner, new_inner, position),
            (TypeRef::List(_), TypeRef::Named(_)) | (TypeRef::Named(_), TypeRef::List(_)) => Severity::Breaking,
            (TypeRef::Named(old_name), TypeRef::Named(new_name)) => {
                if old_name == new_name {
                    Severity::Safe
                } else if position == Position::Output && self.new.is_possible_type(new_name, old_name) {
                    Severity::Dangerous
                } else {
                    Severity::Breaking
                }
            }
        }
    }
}
