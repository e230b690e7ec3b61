use anyhow::anyhow;
use tracing::debug;

use super::{
	error::{
		format_err,
		ErrorCtx,
	},
	Lines,
	Result,
};

/// CD audio frames per second.
pub const FRAMES_PER_SECOND: u32 = 75;

/// Line index of the first frame offset comment.
///
/// Every xmcd generator writes `# xmcd`, `#` and `# Track frame offsets:`
/// ahead of the table, so the table position is fixed.
const OFFSETS_START: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Track {
	pub(super) number: u32,
	pub(super) title: String,
	pub(super) extended_text: String,
	pub(super) offset: u32,
	pub(super) length: u32,
}

impl Track {
	/// 1-based position on the disc.
	pub fn number(&self) -> u32 {
		self.number
	}

	/// Empty when the record has no `TTITLE` line for this track.
	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn extended_text(&self) -> &str {
		&self.extended_text
	}

	/// Start of the track, in frames.
	pub fn offset(&self) -> u32 {
		self.offset
	}

	/// Derived from the distance to the next track's offset, or to the end of
	/// the disc for the last track.
	pub fn length_seconds(&self) -> u32 {
		self.length
	}
}

fn parse_offset(s: &str) -> anyhow::Result<u32> {
	let digits = s
		.strip_prefix('#')
		.ok_or_else(|| anyhow!("expected a frame offset comment, found {s:?}"))?
		.trim();

	digits
		.parse::<u32>()
		.map_err(|_| anyhow!("invalid frame offset: {digits:?}"))
}

/// Reads the `count` frame offsets of the table at the head of the record.
pub(super) fn frame_offsets(lines: &Lines, count: usize) -> Result<Vec<u32>> {
	(OFFSETS_START..OFFSETS_START + count)
		.map(|ln| {
			let s = lines
				.get(ln)
				.ok_or_else(|| anyhow!("record ends before all {count} frame offsets"))
				.line(ln)?;
			parse_offset(s).line(ln)
		})
		.collect()
}

/// Track lengths in seconds, given the track start offsets and the disc length.
pub(super) fn lengths(offsets: &[u32], disc_seconds: u32) -> Result<Vec<u32>> {
	let lead_out = disc_seconds
		.checked_mul(FRAMES_PER_SECOND)
		.ok_or_else(|| format_err!("disc length of {disc_seconds} seconds is out of range"))?;

	let lengths = offsets
		.iter()
		.copied()
		.chain([lead_out])
		.collect::<Vec<_>>()
		.windows(2)
		.enumerate()
		.map(|(i, pair)| match pair[1].checked_sub(pair[0]) {
			Some(frames) => Ok(frames / FRAMES_PER_SECOND),
			None if i + 1 == offsets.len() => Err(format_err!(
				"track {} starts at frame {} past the end of the disc ({lead_out})",
				i + 1,
				pair[0],
			)),
			None => Err::<u32, _>(anyhow!(
				"frame offset {} is lower than the previous one ({})",
				pair[1],
				pair[0]
			))
			.line(OFFSETS_START + i + 1),
		})
		.collect::<Result<Vec<_>>>()?;

	debug!(tracks = lengths.len(), lead_out, "derived track lengths");
	Ok(lengths)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn offsets_accept_tabs_and_padding() {
		let lines = Lines::parse("# xmcd\n#\n# Track frame offsets:\n#\t150\n#       3150\n# 9000\n#\n");
		assert_eq!(frame_offsets(&lines, 3).unwrap(), [150, 3150, 9000]);
	}

	#[test]
	fn missing_offset_points_at_line() {
		let lines = Lines::parse("# xmcd\n#\n# Track frame offsets:\n#\t150\n#\n");
		let e = frame_offsets(&lines, 3).unwrap_err();
		assert!(e.is_format());
		assert_eq!(e.line(), Some(4));

		let e = frame_offsets(&lines, 4).unwrap_err();
		assert_eq!(e.line(), Some(4));
	}

	#[test]
	fn record_too_short_for_table() {
		let lines = Lines::parse("# xmcd\n#\n# Track frame offsets:\n#\t150");
		let e = frame_offsets(&lines, 2).unwrap_err();
		assert_eq!(e.line(), Some(4));
	}

	#[test]
	fn lengths_use_next_offset_and_lead_out() {
		// 40s, 60.5s and a last track running to the 120s mark.
		let offsets = [150, 150 + 40 * 75, 150 + 100 * 75 + 37];
		assert_eq!(lengths(&offsets, 120).unwrap(), [40, 60, 17]);
	}

	#[test]
	fn descending_offsets_are_rejected() {
		let e = lengths(&[150, 9000, 4000], 600).unwrap_err();
		assert_eq!(e.line(), Some(5));
	}

	#[test]
	fn track_past_lead_out_is_rejected() {
		let e = lengths(&[150, 9000], 60).unwrap_err();
		assert!(e.is_format());
		assert_eq!(e.line(), None);
	}
}
