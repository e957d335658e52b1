pub mod normal;
pub mod robust;

pub use normal::{norm_ppf, pearson_correlation};
pub use robust::{median, modified_z_scores, qn_scale};
