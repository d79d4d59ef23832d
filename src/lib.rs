pub mod config;
pub mod logger;
pub mod newsroom;
pub mod news_store;
pub mod post;
pub mod reconciler;
pub mod deploy;
pub mod text_utils;
pub mod media;
pub mod post_list;
pub mod content;
pub mod view;
mod util;
mod test_data;
