//! Schema model: the immutable, positioned tree produced by the parser.

mod ast;

pub use ast::{
    ArrowExpr, BinaryExpr, BinaryOp, Definition, Expression, Permission, Relation,
    RelationOrPermission, RelationRef, Schema, TypeRef,
};
