mod eq_update;
pub use eq_update::*;

mod pending_operation;
pub use pending_operation::*;
