//! Answer contract integration.
//!
//! `gateway.rs` owns the ABI; `answer.rs` owns the meaning of the stored
//! value. Neither keeps state.

pub mod answer;
pub mod gateway;

pub use answer::AnswerState;
pub use gateway::{AnswerGiven, ContractGateway};
