//!  Storage is organized through [log_file::CsvLogStorage] and [image_store::DirectoryImageStorage].
//!  The basic idea is:
//!   - There is a dataset directory with one subdirectory (partition) per label.
//!   - Every saved photo is a uniquely named JPEG inside its label partition.
//!   - The log of saved photos is a single CSV file that gets rewritten in full on every save.

pub mod entities;
pub mod image_store;
pub mod log_file;
