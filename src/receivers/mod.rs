pub mod transactions;

pub use transactions::FirstTransactionRecorder;
