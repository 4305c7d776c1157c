pub mod preprocessing;
pub mod hough;
pub mod polygons;
pub mod simplification;

pub use preprocessing::*;
pub use hough::*;
pub use polygons::*;
pub use simplification::*;
