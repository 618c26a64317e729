pub mod encode;
pub mod menu;
pub mod predict;
