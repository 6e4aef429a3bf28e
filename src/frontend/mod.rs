pub mod lexer;
pub mod parser;
pub mod token;
pub mod token_dumper;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};
