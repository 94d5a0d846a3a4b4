//! Built-in recipes, one per supported target server.

pub mod mlx_lm;
pub mod mlx_vlm;
