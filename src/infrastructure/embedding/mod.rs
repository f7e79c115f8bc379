mod text;

pub use text::{TextEmbedding, API_KEY_VAR};
