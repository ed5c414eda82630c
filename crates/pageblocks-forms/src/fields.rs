//! Kind-specific cleaning
//!
//! Each module turns raw JSON input for one [`FieldKind`](crate::FieldKind)
//! into a [`FieldValue`](crate::FieldValue). Dispatch happens in
//! [`FieldDescriptor::clean`](crate::FieldDescriptor::clean).

pub(crate) mod boolean;
pub(crate) mod choice;
pub(crate) mod image;
pub(crate) mod integer;
pub(crate) mod text;
pub(crate) mod url;
