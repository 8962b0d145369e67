pub mod loaders;
pub mod product_codes;
pub mod run;
pub mod run_options;
pub mod work_order;

pub use loaders::load_product_codes;
pub use product_codes::ProductCodeList;
pub use run::{CodeOutcome, FailureReason, RetryState, RowOutcome, RunSummary};
pub use run_options::{RunInputs, RunOptions};
pub use work_order::WorkOrderRow;
