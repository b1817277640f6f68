mod backbone;
mod config_display;
mod config_overrides;
mod image_resize_mode;
mod loss_weights;
mod model_config;

pub use backbone::*;
pub use config_display::*;
pub use config_overrides::*;
pub use image_resize_mode::*;
pub use loss_weights::*;
pub use model_config::*;
