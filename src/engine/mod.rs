//! Offline engine
//!
//! Planar stereo buffers and WAV file I/O used by the CLI to drive the
//! DSP chain the same way a host audio callback would.

pub mod buffer;
pub mod io;

pub use buffer::StereoBuffer;
pub use io::{export_wav, import_wav, ExportFormat};
