pub mod llvm_cov;

pub use llvm_cov::{decode_count, parse, parse_lines, DecodeError};
