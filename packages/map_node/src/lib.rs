//! Node tree framework for map documents.
//!
//! A map document is a tree of nodes. Every node can reset itself to a
//! default, convert to and from structured text, and write itself into a
//! fixed little-endian binary layout. Leaves hold scalars and buffers;
//! composites, lists and variants combine other nodes.

#[macro_use]
extern crate tracing;

pub mod error;
pub mod bin;
pub mod node;
pub mod journal;
pub mod leaf;
pub mod composite;
pub mod list;
pub mod variant;
pub mod type_code;

pub use crate::{
    error::{Error, ErrorKind, Result, ResultExt},
    bin::{BinWriter, BinReader},
    node::{MapNode, Inspect, Json, JsonMap, encode_to_vec, from_json},
    journal::{ErrorJournal, ErrorNote, Severity},
    leaf::{FloatValue, IntValue, BoolValue, Vec3Value, QuatValue, IdentStr, FloatBuffer},
    composite::Composite,
    list::UniformList,
    variant::{Variant, VariantList, VariantSet},
    type_code::TypeCodeRegistry,
};
