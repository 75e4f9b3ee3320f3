//! High-level loading of exposure inputs and writing of result tables.

pub mod loaders;


pub use loaders::{
    write_group_diagnostics_csv, write_integration_times_csv, ExposureData, ExposureLoader,
    LoadedSegment,
};
