pub mod hit;
pub mod markup;
#[cfg(feature = "raster")]
pub mod raster;

pub use hit::{HitTarget, hit_test};
pub use markup::{ViewerState, ViewerTheme, escape_xml, render_static, render_viewer};
#[cfg(feature = "raster")]
pub use raster::{RasterError, RasterImage, RasterOptions, rasterize, scene_to_png, svg_to_png};
