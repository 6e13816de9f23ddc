pub use glimpse_render::*;

mod previewer;

pub use previewer::Previewer;
