//! State management for the changes view.

mod controller;
mod load_state;
mod view_model;

pub use controller::ChangesController;
pub use load_state::{FetchRequest, LoadState, RequestId};
pub use view_model::{ChangesView, ChangesViewModel, FileIndexEntry};
