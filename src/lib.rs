//! LINE Storyteller: keyword-routed news and story replies for a LINE bot.

pub mod channels;
pub mod config;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod news;
pub mod pipeline;
pub mod story;
