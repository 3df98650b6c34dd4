//! Schema reconciliation
//!
//! Folds a session's requested fields and metadata into the stored schema of
//! a document class. Names compare case-insensitively and are persisted in
//! canonical (lower-case) form, so repeated sessions never accumulate
//! differently-cased duplicates.

use docket_core::schema::contains_name;
use docket_core::{canonical_name, FieldSpec, SchemaRequest, SchemaSpec};

/// Merge `request` into `spec`, returning whether `spec` changed
///
/// Entries already present in `spec` keep their position. New entries are
/// appended in request order. A requested numeric flag upgrades an existing
/// text field; a request never downgrades a numeric field.
pub fn augment_spec(spec: &mut SchemaSpec, request: &SchemaRequest) -> bool {
    let before = spec.clone();

    canonicalize(spec);
    for field in &request.fields {
        let name = canonical_name(&field.name);
        if name.is_empty() {
            continue;
        }
        match spec.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.numeric |= field.numeric,
            None => spec.fields.push(FieldSpec {
                name,
                numeric: field.numeric,
            }),
        }
    }
    union_names(&mut spec.metadata, &request.metadata);
    union_names(&mut spec.forward, &request.forward);
    union_names(&mut spec.backward, &request.backward);

    *spec != before
}

/// Lower-case every stored name and drop case-insensitive duplicates
fn canonicalize(spec: &mut SchemaSpec) {
    spec.class = canonical_name(&spec.class);

    let mut fields: Vec<FieldSpec> = Vec::with_capacity(spec.fields.len());
    for field in spec.fields.drain(..) {
        let name = canonical_name(&field.name);
        match fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.numeric |= field.numeric,
            None => fields.push(FieldSpec {
                name,
                numeric: field.numeric,
            }),
        }
    }
    spec.fields = fields;

    for list in [
        &mut spec.include,
        &mut spec.metadata,
        &mut spec.forward,
        &mut spec.backward,
    ] {
        let names = std::mem::take(list);
        union_names(list, &names);
    }
}

fn union_names(target: &mut Vec<String>, requested: &[String]) {
    for name in requested {
        let name = canonical_name(name);
        if !name.is_empty() && !contains_name(target, &name) {
            target.push(name);
        }
    }
}
