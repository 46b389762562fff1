pub mod error;
pub mod formats;
pub mod fs;
pub mod logging;

pub use error::{PathError, RecodeError, RecodeResult};
pub use formats::{SourceFormat, format_from_extension};
pub use fs::{
    collect_files_with_extensions, ensure_parent_dir, file_exists, file_size, validate_input_path,
};
pub use logging::init_tracing;
