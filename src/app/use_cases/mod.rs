//! Use-Cases des Kommandozeilen-Werkzeugs.

pub mod file_io;
pub mod route;
