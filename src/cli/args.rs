//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tracefox",
    about = "Convert an Instruments trace to Gecko format (Firefox Profiler)",
    after_help = "\
EXAMPLES:
    tracefox -i MyApp.trace -o profile.json.gz
    tracefox -i MyApp.trace --app MyApp --run 2 -o profile.json.gz

Open the output at https://profiler.firefox.com/ (Load a profile from file)."
)]
pub struct Args {
    /// Input Instruments trace container
    #[arg(short = 'i', long, value_name = "TRACE")]
    pub input: PathBuf,

    /// Name of the profiled app, recorded in the profile metadata
    #[arg(long)]
    pub app: Option<String>,

    /// Which run within the trace file to convert
    #[arg(long, default_value_t = 1)]
    pub run: u32,

    /// Output path for the gzipped Gecko profile
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults_to_one() {
        let args = Args::try_parse_from(["tracefox", "-i", "a.trace", "-o", "out.json.gz"]).unwrap();
        assert_eq!(args.run, 1);
        assert!(args.app.is_none());
    }

    #[test]
    fn test_input_and_output_are_required() {
        assert!(Args::try_parse_from(["tracefox", "-i", "a.trace"]).is_err());
        assert!(Args::try_parse_from(["tracefox", "-o", "out.json.gz"]).is_err());
    }
}
