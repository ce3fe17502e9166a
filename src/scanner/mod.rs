pub mod directory_scanner;
pub mod extract_resolver;

pub use directory_scanner::{DirectoryScanner, DirectorySnapshot, FileEntry};
pub use extract_resolver::{ExtractResolver, ResolvedExtract};
