mod build;
mod interaction;
mod view;

pub(in crate::app) use build::{GraphFilter, assemble_render_graph};
