use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use gfilter::{init_logging, Filter, Mode};

#[derive(Parser)]
#[command(
    name = "gfilter",
    version,
    about = "Rewrite G-code for laser cutters and drag knives"
)]
struct Cli {
    /// Laser mode: head acceleration in mm/s^2
    #[arg(short = 'l', value_name = "ACC", conflicts_with = "drag")]
    laser: Option<f64>,

    /// Drag knife mode: blade offset in mm
    #[arg(short = 'd', value_name = "OFFS")]
    drag: Option<f64>,

    /// Max deflection angle treated as a continuous curve (degrees)
    #[arg(short = 'a', value_name = "DEG", default_value_t = 2.0)]
    angle: f64,

    /// Input file (stdin when omitted)
    infile: Option<PathBuf>,

    /// Output file (stdout when omitted)
    outfile: Option<PathBuf>,
}

fn main() -> ExitCode {
    if init_logging().is_err() {
        eprintln!("gfilter: could not initialize logging");
        return ExitCode::from(1);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            // --help and --version arrive as pseudo-errors and exit
            // successfully; real usage errors exit 1.
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let mode = match (cli.laser, cli.drag) {
        (Some(acceleration), None) => Mode::Laser { acceleration },
        (None, Some(offset)) => Mode::Drag { offset },
        _ => {
            eprintln!("gfilter: exactly one of -l <acc> or -d <offs> is required");
            return ExitCode::from(1);
        }
    };

    let input: Box<dyn BufRead> = match &cli.infile {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(err) => {
                eprintln!("gfilter: could not open input file {}: {err}", path.display());
                return ExitCode::from(2);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut output: Box<dyn Write> = match &cli.outfile {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(err) => {
                eprintln!("gfilter: could not open output {}: {err}", path.display());
                return ExitCode::from(3);
            }
        },
        None => Box::new(io::stdout()),
    };

    let mut filter = Filter::new(mode, cli.angle);
    let result = filter
        .run(input, &mut output)
        .and_then(|()| output.flush().map_err(Into::into));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("fatal i/o error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
