pub mod acoustics;
pub mod collision;
pub mod entity;
pub mod geometry;
pub mod grid;
pub mod hotbar;
pub mod interaction;
pub mod motion;
pub mod tile;
