pub(crate) mod ast;
#[allow(clippy::module_inception)]
mod parser;

pub(crate) use parser::{Rule, parse};

#[cfg(test)]
mod parse_test;

#[cfg(test)]
mod precedence_test;
