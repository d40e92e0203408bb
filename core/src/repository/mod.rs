pub mod file;
pub mod traits;

// Re-export
pub use file::FileDoseEntryRepository;
pub use traits::DoseEntryRepository;
