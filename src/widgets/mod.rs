pub mod controls;
pub mod debug;
pub mod filter_grid;
pub mod picker;
pub mod preview;
pub mod text_input;
