//! High-level IR — the semantic model behind the generator.
//!
//! - [`symbols`]: types, members and their flags
//! - [`lower`]: syntax tree → symbols
//! - [`index`]: the workspace-wide [`SymbolTable`]
//! - [`imports`]: per-file [`ImportTable`]
//! - [`context`]: what encloses the caret ([`FileContext`])
//! - [`resolve`]: what the token at the caret refers to
//! - [`source`]: path ↔ [`FileId`](crate::base::FileId) bookkeeping
//!
//! Everything here is read-only once built. Edits go through the host in
//! [`crate::ide`], which re-lowers a file after each change.

pub mod context;
pub mod imports;
pub mod index;
pub mod lower;
pub mod resolve;
pub mod source;
pub mod symbols;

pub use context::FileContext;
pub use imports::{Import, ImportSlot, ImportTable};
pub use index::{FileInfo, SymbolIdx, SymbolProvider, SymbolTable};
pub use lower::{FileSymbols, lower_file};
pub use resolve::{
    AccessShape, ExprContext, ExprQuery, MemberRef, ResolutionResult, Segment, TypeTarget,
    context_token, resolve_expression, split_segments,
};
pub use source::FileSet;
pub use symbols::{
    LocalVar, Member, MemberKind, Param, Symbol, TypeKind, TypeRef, Visibility,
};
pub use crate::syntax::Modifiers;
