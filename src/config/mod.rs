//! Configuration management for Kanal.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, SearchSettings, Settings, VectorStoreSettings,
};
