use std::{
	borrow::Cow,
	fs,
	path::Path,
};

use chardetng::EncodingDetector;
use encoding_rs::{
	Encoding,
	UTF_8,
};
use tracing::{
	debug,
	warn,
};

use super::{
	Error,
	Result,
};

/// The raw lines of an xmcd record, terminators stripped, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lines {
	lines: Vec<String>,
}

/// Decodes raw record bytes.
///
/// A BOM wins; otherwise valid UTF-8 is taken as is and anything else goes
/// through charset detection, since most freedb dumps predate UTF-8.
fn decode(data: &[u8]) -> (Cow<'_, str>, &'static Encoding, bool) {
	let guess = match Encoding::for_bom(data) {
		Some((enc, _)) => enc,
		None if std::str::from_utf8(data).is_ok() => UTF_8,
		None => {
			let mut detect = EncodingDetector::new();
			detect.feed(data, true);
			detect.guess(None, false)
		}
	};

	guess.decode(data)
}

impl Lines {
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let data = fs::read(path).map_err(|source| Error::Io {
			path: path.to_path_buf(),
			source,
		})?;

		let (text, encoding, malformed) = decode(&data);
		if encoding != UTF_8 {
			warn!(path = %path.display(), encoding = encoding.name(), "record is not UTF-8, decoded with a guessed charset");
		}
		if malformed {
			warn!(path = %path.display(), "record contains malformed byte sequences");
		}

		let lines = Self::parse(&text);
		debug!(path = %path.display(), lines = lines.len(), "loaded record");
		Ok(lines)
	}

	pub fn parse(text: &str) -> Self {
		Self {
			lines: text.lines().map(String::from).collect(),
		}
	}

	pub fn len(&self) -> usize {
		self.lines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	pub fn get(&self, ln: usize) -> Option<&str> {
		self.lines.get(ln).map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = &'_ str> {
		self.lines.iter().map(String::as_str)
	}

	/// Whether the record starts with the `# xmcd` signature.
	pub fn is_xmcd(&self) -> bool {
		self.get(0).is_some_and(|s| s.starts_with("# xmcd"))
	}

	/// Yields the remainder of every line starting with `keyword`, in order.
	pub fn with_prefix<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.iter().filter_map(move |s| s.strip_prefix(keyword))
	}
}
