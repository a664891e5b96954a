pub mod ast;
pub mod parser;
pub mod planner;
pub mod validator;
