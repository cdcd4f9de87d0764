pub mod expr;
pub mod program;
pub mod stmt;
pub mod types;

pub use expr::{expr_parser, field_parser, operand_parser};
pub use program::{MethodDecl, class_parser, method_parser};
pub use stmt::{BodyItem, stmt_parser};
pub use types::type_parser;
