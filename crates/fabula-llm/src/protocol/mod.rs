//! Wire formats spoken to upstream providers

pub mod openai;
