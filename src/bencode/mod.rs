//! Canonical bencode encoding.
//!
//! Every string-typed value is held as raw bytes, so binary payloads such as
//! concatenated piece digests are encoded exactly like text and never pass
//! through a character encoder. Dictionary keys are kept in a `BTreeMap`
//! ordered by their raw bytes, which is the order bencode requires.

mod encode;
mod value;

pub use encode::{encode, encode_into};
pub use value::Value;
