pub mod auditorium;
pub mod config;
pub mod input;
pub mod menubar;
pub mod occupants;
pub mod random;
pub mod renderer;
pub mod scenario;
pub mod seats;
pub mod session;
pub mod terminal;
pub mod types;
