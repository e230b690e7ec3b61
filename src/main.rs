use std::{
	fmt::Write,
	path::{
		Path,
		PathBuf,
	},
};

use anyhow::{
	anyhow,
	bail,
	ensure,
	Result,
};
use clap::Parser;
use jwalk::WalkDir;
use rayon::prelude::*;
use tracing::{
	debug,
	warn,
};
use tracing_subscriber::EnvFilter;
use xmcd::{
	template::{
		minutes,
		Template,
	},
	Disc,
	Track,
};

const TEMPLATE_VARS: &[&str] = &[
	"no", "title", "ext", "length", "seconds", "offset", "artist", "album",
];

#[derive(Parser)]
/// Xmcd prints the contents of CDDB/freedb disc records.
#[command(version)]
struct Args {
	/// Path to an xmcd record or a directory of records
	#[arg(group = "action")]
	path: Option<PathBuf>,
	/// Maximum number of records parsed in parallel; defaults to about half the available logical CPU cores
	#[arg(short, long)]
	jobs: Option<usize>,

	/// Parse every field without printing anything; useful for validating a dump
	#[arg(long)]
	check: bool,

	/// Template for each track line
	#[arg(short, long, value_parser = parse_template, default_value = "<no>. <title> (<length>)")]
	template: Template,

	/// Log parser activity to stderr
	#[arg(short, long)]
	verbose: bool,

	/// Print help for the template syntax
	#[arg(long, group = "action")]
	template_help: bool,
}

fn parse_template(s: &str) -> Result<Template> {
	let template = Template::new(s);
	for s in template.vars() {
		if !TEMPLATE_VARS.contains(&s) {
			bail!("unrecognized template variable: <{s}>\nrun with --template-help for usage");
		}
	}

	Ok(template)
}

#[cold]
fn show_template_help() {
	println!(
		"\
Each track is printed on its own line using a template.
Variables inside angle brackets <> will be replaced with values.
Allowed variables:
  - <no>: The track number, padded with zeroes to the left if necessary
  - <title>: Track title
  - <ext>: Extended track text (EXTT)
  - <length>: Track length as m:ss
  - <seconds>: Track length in seconds
  - <offset>: Start of the track in CD frames
  - <artist>: Disc artist
  - <album>: Disc title

Any other variable is an error\
"
	);
}

fn init_logging(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init();
}

fn collect_records(path: &Path) -> Vec<PathBuf> {
	if path.is_file() {
		return vec![path.to_path_buf()];
	}

	let mut files = WalkDir::new(path)
		.skip_hidden(false)
		.follow_links(true)
		.into_iter()
		.filter_map(|res| match res {
			Ok(entry) if entry.file_type.is_file() => Some(entry.path()),
			_ => None,
		})
		.collect::<Vec<_>>();

	files.sort_unstable();
	files
}

fn render(disc: &Disc, template: &Template) -> Result<String> {
	let mut out = String::new();
	let ids = disc.all_ids();

	writeln!(out, "{} / {}", disc.artist(), disc.title())?;
	writeln!(out, "  id:        {}", ids.join(", "))?;
	writeln!(out, "  year:      {}", disc.year())?;
	writeln!(out, "  genre:     {}", disc.genre())?;
	writeln!(
		out,
		"  length:    {}",
		minutes(disc.length_seconds()?)
	)?;
	writeln!(out, "  revision:  {}", disc.revision())?;
	writeln!(out, "  submitter: {}", disc.submitted_by())?;

	let ext = disc.extended_text();
	if !ext.is_empty() {
		writeln!(out, "  {ext}")?;
	}

	let tracks = disc.tracks()?;
	let width = tracks.len().max(1).ilog10() as usize + 1;

	for track in &tracks {
		let line = template.expand(|buf, var| expand_var(buf, var, disc, track, width));
		writeln!(out, "{line}")?;
	}

	Ok(out)
}

fn expand_var(buf: &mut String, var: &str, disc: &Disc, track: &Track, width: usize) {
	match var {
		"no" => {
			let _ = write!(buf, "{:0width$}", track.number());
		}
		"title" => buf.push_str(track.title()),
		"ext" => buf.push_str(track.extended_text()),
		"length" => buf.push_str(&minutes(track.length_seconds())),
		"seconds" => {
			let _ = write!(buf, "{}", track.length_seconds());
		}
		"offset" => {
			let _ = write!(buf, "{}", track.offset());
		}
		"artist" => buf.push_str(disc.artist()),
		"album" => buf.push_str(disc.title()),
		_ => unreachable!(),
	}
}

/// Touches every derived field so that format errors surface.
fn check(disc: &Disc) -> Result<()> {
	disc.length_seconds()?;
	disc.play_order()?;
	let tracks = disc.tracks()?;
	match disc.id() {
		Some(id) => debug!(id = %id, tracks = tracks.len(), "record ok"),
		None => warn!(tracks = tracks.len(), "record has no DISCID"),
	}
	Ok(())
}

fn run() -> Result<()> {
	let mut args = Args::parse();
	if args.template_help {
		show_template_help();
		return Ok(());
	}

	init_logging(args.verbose);

	let path = args
		.path
		.take()
		.ok_or_else(|| anyhow!("missing path; run with --help for usage"))?;
	if !path.exists() {
		bail!("file or directory does not exist: {}", path.display());
	}
	let walked = path.is_dir();

	if let Some(n) = args.jobs.or_else(|| {
		std::thread::available_parallelism()
			.ok()
			.map(|n| n.get() / 2 + 1)
	}) {
		let _ = rayon::ThreadPoolBuilder::new()
			.num_threads(n)
			.build_global();
	}

	let files = collect_records(&path);
	let results = files
		.par_iter()
		.map(|p| -> Result<Option<String>> {
			let disc = Disc::load(p)?;
			if walked && !disc.lines().is_xmcd() {
				debug!(path = %p.display(), "skipping file without an xmcd signature");
				return Ok(None);
			}

			if args.check {
				check(&disc).map(|_| None)
			} else {
				render(&disc, &args.template).map(Some)
			}
		})
		.collect::<Vec<_>>();

	let mut failed = 0;
	let mut parsed = 0;
	for (p, res) in files.iter().zip(results) {
		match res {
			Ok(None) => (),
			Ok(Some(s)) => {
				parsed += 1;
				if parsed > 1 {
					println!();
				}
				print!("{s}");
			}
			Err(e) => {
				failed += 1;
				eprintln!("error: {}: {e}", p.display());
			}
		}
	}

	ensure!(failed == 0, "{failed} of {} records could not be read", files.len());
	Ok(())
}

fn main() {
	if let Err(e) = run() {
		eprintln!("error: {e:?}");
		std::process::exit(1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fixture(name: &str) -> PathBuf {
		PathBuf::from(env!("CARGO_MANIFEST_DIR"))
			.join("tests/fixtures")
			.join(name)
	}

	#[test]
	fn unknown_template_variable() {
		assert!(parse_template("<no> <title>").is_ok());
		assert!(parse_template("<no> <year>").is_err());
	}

	#[test]
	fn render_pads_track_numbers() {
		let disc = Disc::load(fixture("veronika")).unwrap();
		let out = render(&disc, &Template::new("<no>. <title> (<length>)")).unwrap();
		assert!(out.starts_with("Zbigniew Preisner / The double life of Veronika/Kieslowski\n"));
		assert!(out.contains("  length:    31:09\n"));
		assert!(out.contains("\n01. Weronika (0:40)\n"));
		assert!(out.ends_with("18. Finale (1:25)\n"));
	}

	#[test]
	fn render_custom_template() {
		let disc = Disc::load(fixture("blonde")).unwrap();
		let template = parse_template("<artist> - <album> - <no> - <title> [<seconds>s @<offset>]").unwrap();
		let out = render(&disc, &template).unwrap();
		assert!(out.contains(
			"\nBob Dylan - Blonde on Blonde - 2 - Pledging My Time [223s @23550]\n"
		));
	}

	#[test]
	fn walk_finds_fixtures_in_order() {
		let files = collect_records(&fixture(""));
		let names = files
			.iter()
			.filter_map(|p| p.file_name()?.to_str())
			.collect::<Vec<_>>();
		assert_eq!(names, ["blonde", "veronika"]);
	}

	#[test]
	fn check_allows_missing_discid() {
		let disc = Disc::parse(
			"# xmcd\n#\n# Track frame offsets:\n#\t150\n#\n# Disc length: 60 seconds\nTTITLE0=Intro\n",
		);
		assert_eq!(disc.id(), None);
		check(&disc).unwrap();
	}

	#[test]
	fn check_accepts_fixtures() {
		for name in ["blonde", "veronika"] {
			check(&Disc::load(fixture(name)).unwrap()).unwrap();
		}
	}
}
