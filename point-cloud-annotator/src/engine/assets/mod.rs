/// JSON scene settings asset and the loader that applies it.
pub mod scene_settings;
