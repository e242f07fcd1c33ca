use super::*;

mod helpers;
mod render_basic;
mod render_embed;
