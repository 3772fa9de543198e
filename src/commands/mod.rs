pub mod completions;
pub mod levels;
pub mod replay;
