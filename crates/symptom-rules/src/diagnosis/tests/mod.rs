mod common;
mod evaluator;
