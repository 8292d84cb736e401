//! Procedural macros for Scena host records
//!
//! This crate provides `#[derive(Record)]`, which describes the fields of a
//! struct so that it can be exposed to documents.

extern crate proc_macro;

use proc_macro::TokenStream;

mod record;

/// Derive `Record` and `HostObject` for a struct with named fields.
///
/// Every field is bound under its name lowercased. The field type must
/// implement `ToValue`.
///
/// # Example
///
/// ```ignore
/// #[derive(Record)]
/// struct Settings {
///     Width: f64,
///     #[record(rename = "label")]
///     title: String,
///     #[record(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// This binds `width` and `label`. Two fields whose binding names collide
/// after lowercasing are rejected at compile time.
///
/// # Field Attributes
///
/// - `#[record(skip)]`: do not export the field.
/// - `#[record(rename = "name")]`: export the field under `name`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(item: TokenStream) -> TokenStream {
    record::derive_record_impl(item)
}
