pub mod pending;
pub mod intake;

pub use pending::PendingPool;
pub use intake::{validate_vote_input, MAX_FIELD_LEN};
