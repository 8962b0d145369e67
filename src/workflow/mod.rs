pub mod close_out;
pub mod order_flow;
pub mod row_ctx;

pub use close_out::{run_close_out, CloseOutResult};
pub use order_flow::OrderProcessor;
pub use row_ctx::RowCtx;
