pub mod cards;
pub mod countdown;
pub mod header;
pub mod statusbar;
