// Presentation layer - Console stand-in for the display collaborator
pub mod console;
