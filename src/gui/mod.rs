//! デスクトップGUI

mod app;
mod theme;

pub use app::run;
