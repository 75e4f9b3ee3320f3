//! Frame-counting model and timing reconciliation for multi-integration
//! exposures.

pub mod frame_index;
pub mod reconcile;

pub use frame_index::{frame_end_time, running_frame_index};
pub use reconcile::{fit_timing_model, predict_integration_times, TimingFit, TimingModel};
