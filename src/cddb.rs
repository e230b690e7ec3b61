mod error;
mod lines;
mod track;

use std::{
	path::Path,
	str::FromStr,
	sync::OnceLock,
};

pub use self::{
	error::{
		Error,
		Result,
	},
	lines::Lines,
	track::{
		Track,
		FRAMES_PER_SECOND,
	},
};
use self::error::format_err;

const TITLE_SEPARATOR: &str = " / ";

/// A parsed xmcd (freedb) record.
///
/// Fields are read from the lines on demand. The artist/title split and the
/// track count are computed once and shared between threads.
#[derive(Debug, Default)]
pub struct Disc {
	lines: Lines,
	// (artist, title)
	dtitle: OnceLock<(String, String)>,
	last_track: OnceLock<Option<usize>>,
}

impl From<Lines> for Disc {
	fn from(lines: Lines) -> Self {
		Self {
			lines,
			dtitle: OnceLock::new(),
			last_track: OnceLock::new(),
		}
	}
}

impl FromStr for Disc {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::parse(s))
	}
}

/// Splits `DTITLE` into (artist, title); a title without a separator names both.
fn split_dtitle(s: &str) -> (String, String) {
	match s.split_once(TITLE_SEPARATOR) {
		Some((artist, title)) => (artist.to_string(), title.to_string()),
		None => (s.to_string(), s.to_string()),
	}
}

/// Parses the `N` of a `TTITLEN=` line.
fn ttitle_index(s: &str) -> Option<usize> {
	let rest = s.strip_prefix("TTITLE")?;
	let end = rest.find(|c: char| !c.is_ascii_digit())?;
	if end == 0 || !rest[end..].starts_with('=') {
		return None;
	}

	rest[..end].parse().ok()
}

impl Disc {
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		Lines::load(path).map(Self::from)
	}

	pub fn parse(text: &str) -> Self {
		Self::from(Lines::parse(text))
	}

	pub fn lines(&self) -> &Lines {
		&self.lines
	}

	/// Concatenates the remainders of every line starting with `keyword`.
	///
	/// xmcd wraps long values over several lines with the same keyword, so
	/// joining without a separator restores the original value. An absent
	/// field is an empty string.
	pub fn field(&self, keyword: &str) -> String {
		self.lines.with_prefix(keyword).collect()
	}

	/// Collects `{prefix}{i}=` for every track index, keeping empty slots.
	pub fn fields_by_index(&self, prefix: &str) -> Result<Vec<String>> {
		let last = self.last_track_index()?;
		Ok((0..=last)
			.map(|i| self.field(&format!("{prefix}{i}=")))
			.collect())
	}

	/// The first disc id, or `None` if the record has no `DISCID` line.
	pub fn id(&self) -> Option<String> {
		self.all_ids().into_iter().next()
	}

	pub fn all_ids(&self) -> Vec<String> {
		let ids = self.field("DISCID=");
		ids.split(',')
			.filter(|s| !s.is_empty())
			.map(String::from)
			.collect()
	}

	fn dtitle(&self) -> &(String, String) {
		self.dtitle
			.get_or_init(|| split_dtitle(&self.field("DTITLE=")))
	}

	pub fn artist(&self) -> &str {
		&self.dtitle().0
	}

	pub fn title(&self) -> &str {
		&self.dtitle().1
	}

	pub fn year(&self) -> String {
		self.field("DYEAR=")
	}

	pub fn genre(&self) -> String {
		self.field("DGENRE=")
	}

	pub fn extended_text(&self) -> String {
		self.field("EXTD=")
	}

	pub fn revision(&self) -> String {
		self.field("# Revision: ")
	}

	pub fn submitted_by(&self) -> String {
		self.field("# Submitted via: ")
	}

	pub fn processed_by(&self) -> String {
		self.field("# Processed by: ")
	}

	/// Total playing time from the `# Disc length:` comment.
	pub fn length_seconds(&self) -> Result<u32> {
		let raw = self.field("# Disc length: ");
		raw.strip_suffix(" seconds")
			.and_then(|n| n.parse().ok())
			.ok_or_else(|| format_err!("invalid disc length: {raw:?}"))
	}

	/// Track numbers from `PLAYORDER`, empty when unset.
	pub fn play_order(&self) -> Result<Vec<u32>> {
		let raw = self.field("PLAYORDER=");
		raw.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(|s| {
				s.parse()
					.map_err(|_| format_err!("invalid track number in PLAYORDER: {s:?}"))
			})
			.collect()
	}

	/// Highest `TTITLE` index; every track needs its own offset line, so an
	/// index past the end of the record is rejected.
	fn last_track_index(&self) -> Result<usize> {
		let last = self
			.last_track
			.get_or_init(|| self.lines.iter().filter_map(ttitle_index).max())
			.as_ref()
			.copied()
			.ok_or_else(|| format_err!("record has no TTITLE lines"))?;

		if last >= self.lines.len() {
			return Err(format_err!(
				"TTITLE{last} is out of range for a record of {} lines",
				self.lines.len()
			));
		}

		Ok(last)
	}

	pub fn track_count(&self) -> Result<usize> {
		self.last_track_index()?
			.checked_add(1)
			.ok_or_else(|| format_err!("too many tracks"))
	}

	pub fn tracks(&self) -> Result<Vec<Track>> {
		let count = self.track_count()?;
		let offsets = track::frame_offsets(&self.lines, count)?;
		let lengths = track::lengths(&offsets, self.length_seconds()?)?;
		let titles = self.fields_by_index("TTITLE")?;
		let extended = self.fields_by_index("EXTT")?;

		Ok(titles
			.into_iter()
			.zip(extended)
			.zip(offsets.into_iter().zip(lengths))
			.enumerate()
			.map(|(i, ((title, extended_text), (offset, length)))| Track {
				number: i as u32 + 1,
				title,
				extended_text,
				offset,
				length,
			})
			.collect())
	}
}
