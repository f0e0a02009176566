pub mod storage;

pub use storage::ThreadStore;
