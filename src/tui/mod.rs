pub mod field;
pub mod theme;

pub use field::TextField;
pub use theme::Theme;
