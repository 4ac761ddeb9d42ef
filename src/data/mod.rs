//! Data loading
//!
//! Game definitions and engine configuration live in external RON or JSON
//! files, so reward tuning does not need a rebuild.

pub mod loader;

pub use loader::{
    DataError, DEFAULT_DATA_DIR,
    load_game, save_game, load_engine_config, export_default_data, sample_game,
};
