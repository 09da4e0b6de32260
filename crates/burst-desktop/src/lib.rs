pub mod bench;
pub mod scope;
pub mod scope_tui;
