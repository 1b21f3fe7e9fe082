//! Trained embedding matrices and their on-disk formats.

pub mod npy;
pub mod store;

pub use npy::load_npy_f32;
pub use store::{EmbeddingStore, STORE_FILE};
