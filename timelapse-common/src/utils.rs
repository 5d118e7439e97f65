pub mod cancel;
pub mod font;
pub mod fsutils;
pub mod imgutils;
pub mod time;
