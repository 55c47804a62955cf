pub mod dot;

pub use dot::DotRenderer;
