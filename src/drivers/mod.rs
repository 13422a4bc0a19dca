//! Device drivers: the frequency-converter drive and the button pad.

pub mod buttons;
pub mod drive;
