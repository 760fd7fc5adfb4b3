//! treeq - re-encode structured documents
//!
//! Decodes YAML/JSON input and prints every document in the selected output
//! format through the results printer.

mod cli;
mod version;

use std::fs;
use std::io::{self, Cursor, Read};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;
use treeq_core::{
    decode_documents, format, split_front_matter, MultiFileWriter, PrinterWriter, ResultsPrinter,
    SingleWriter,
};

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = initialize_logging(args.verbose) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr subscriber; WARN by default, DEBUG with `-v`
fn initialize_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// One input: display name and full contents
struct Input {
    name: String,
    source: String,
}

fn read_inputs(files: &[String]) -> Result<Vec<Input>> {
    if files.is_empty() {
        if atty::is(atty::Stream::Stdin) {
            bail!("no input files given and stdin is a terminal");
        }
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("cannot read stdin")?;
        return Ok(vec![Input {
            name: "-".to_string(),
            source,
        }]);
    }

    files
        .iter()
        .map(|name| {
            let source = if name == "-" {
                let mut source = String::new();
                io::stdin().read_to_string(&mut source).context("cannot read stdin")?;
                source
            } else {
                fs::read_to_string(name).with_context(|| format!("cannot read {}", name))?
            };
            Ok(Input {
                name: name.clone(),
                source,
            })
        })
        .collect()
}

fn run(args: Args) -> Result<ExitCode> {
    if args.version {
        version::print_version();
        return Ok(ExitCode::SUCCESS);
    }
    if args.version_verbose {
        version::print_version_verbose();
        return Ok(ExitCode::SUCCESS);
    }
    if args.list_formats {
        version::print_formats();
        return Ok(ExitCode::SUCCESS);
    }

    let output_format = format::resolve(&args.output_format)?;
    let encoder = output_format.construct(&args.preferences())?;
    debug!(format = output_format.formal_name, "selected output format");

    let writer: Box<dyn PrinterWriter> = match &args.split_dir {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir))?;
            Box::new(MultiFileWriter::new(
                dir,
                args.split_name.as_str(),
                output_format.extension(),
            ))
        }
        None => Box::new(SingleWriter::new(io::stdout())),
    };

    let mut printer = ResultsPrinter::new(encoder, writer);
    printer.set_nul_sep_output(args.nul_output);

    for (file_index, input) in read_inputs(&args.files)?.into_iter().enumerate() {
        // Front matter: decode the header only, pass the body through untouched
        let front_matter = if args.front_matter {
            split_front_matter(&input.source)
        } else {
            None
        };
        let (header, appendix) = match front_matter {
            Some(front_matter) => (front_matter.header, Some(front_matter.body)),
            None => (input.source, None),
        };

        let nodes = decode_documents(&header, file_index, &input.name)?;
        printer.set_appendix(appendix.map(|body| Box::new(Cursor::new(body.into_bytes())) as Box<dyn Read>));
        printer
            .print_results(nodes)
            .with_context(|| format!("cannot print {}", input.name))?;
    }

    if args.exit_status && !printer.printed_anything() {
        debug!("nothing printed, exiting with status 1");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
