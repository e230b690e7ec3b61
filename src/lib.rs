//! Reader for xmcd records, the text format served by CDDB and freedb.
//!
//! ```no_run
//! let disc = xmcd::Disc::load("rock/2203fd04")?;
//! println!("{} - {}", disc.artist(), disc.title());
//! for track in disc.tracks()? {
//! 	println!("{:02}. {} ({}s)", track.number(), track.title(), track.length_seconds());
//! }
//! # Ok::<(), xmcd::Error>(())
//! ```

pub mod cddb;
pub mod template;

pub use cddb::{
	Disc,
	Error,
	Lines,
	Result,
	Track,
};
