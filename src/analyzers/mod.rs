pub mod qc;

pub use qc::{QcAnalyzer, QcReport};
