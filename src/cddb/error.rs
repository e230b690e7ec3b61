use std::{
	io,
	path::PathBuf,
};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
	/// The record could not be read from disk.
	#[error("error reading {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The record does not follow the xmcd layout a requested field depends on.
	///
	/// `line` is 0-based; it is displayed 1-based.
	#[error("{}{msg}", .line.map_or_else(String::new, |ln| format!("line {}: ", ln + 1)))]
	Format {
		line: Option<usize>,
		msg: anyhow::Error,
	},
}

impl Error {
	pub(crate) fn format(msg: anyhow::Error) -> Self {
		Self::Format { line: None, msg }
	}

	pub fn is_format(&self) -> bool {
		matches!(self, Self::Format { .. })
	}

	/// The 0-based line a format error points at, if any.
	pub fn line(&self) -> Option<usize> {
		match self {
			Self::Format { line, .. } => *line,
			Self::Io { .. } => None,
		}
	}
}

pub trait ErrorCtx<T> {
	fn line(self, ln: usize) -> Result<T>;
}

impl<T> ErrorCtx<T> for Result<T, anyhow::Error> {
	fn line(self, ln: usize) -> Result<T> {
		self.map_err(|msg| Error::Format {
			line: Some(ln),
			msg,
		})
	}
}

macro_rules! format_err {
	[$($args:tt)+] => {
		$crate::cddb::Error::format(anyhow::anyhow!($($args)+))
	};
}

pub(crate) use format_err;
