use clap::{Args, Parser, Subcommand};
use rust_optar::config::CalibrationConfig;
use rust_optar::models::{FecOrder, PageConstants, PageFormat};
use rust_optar::tools::{PageImageFormat, decode_files, encode_file};
use rust_optar::{OptarError, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "optar", version, about = "Store files on paper and read them back from scans")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a file as printable pages
    Encode {
        /// File to encode, `-` for stdin
        input: PathBuf,
        /// Output base name; pages become <base>_0001.pgm, ...
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Text printed in the footer of every page
        #[arg(long)]
        label: Option<String>,
        /// Write PNG instead of PGM
        #[arg(long)]
        png: bool,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Decode scanned pages <base>_0001.png, <base>_0002.png, ...
    Decode {
        /// Format descriptor from the page footer, e.g. 0-33-47-24-3-1-2-24
        format: PageFormat,
        /// Scan base name
        base: PathBuf,
        /// Where to write the payload; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Skip the _debug.pgm diagnostic images
        #[arg(long)]
        no_debug: bool,
    },
    /// Print the capacity and overhead of a format
    Info {
        #[command(flatten)]
        format: FormatArgs,
    },
}

/// Page layout, either as a descriptor or field by field on top of the
/// default format
#[derive(Args)]
struct FormatArgs {
    /// Full format descriptor; overrides the individual flags
    #[arg(long = "format")]
    descriptor: Option<PageFormat>,
    /// Crosses per row
    #[arg(long)]
    xcrosses: Option<u32>,
    /// Crosses per column
    #[arg(long)]
    ycrosses: Option<u32>,
    /// Cross pitch in pixels
    #[arg(long)]
    cpitch: Option<u32>,
    /// Half the cross size in pixels
    #[arg(long)]
    chalf: Option<u32>,
    /// 1 for Golay, 2 to 5 for Hamming of that order
    #[arg(long)]
    fec: Option<u32>,
    /// Frame width in pixels
    #[arg(long)]
    border: Option<u32>,
    /// Footer height in pixels, 0 for no label
    #[arg(long)]
    text_height: Option<u32>,
}

impl FormatArgs {
    fn resolve(&self) -> Result<PageFormat> {
        if let Some(format) = self.descriptor {
            return Ok(format);
        }
        let d = PageFormat::default();
        let fec = match self.fec {
            Some(order) => FecOrder::from_number(order)
                .ok_or_else(|| OptarError::InvalidFormat(format!("unknown FEC order {}", order)))?,
            None => d.fec,
        };
        let format = PageFormat {
            xcrosses: self.xcrosses.unwrap_or(d.xcrosses),
            ycrosses: self.ycrosses.unwrap_or(d.ycrosses),
            cpitch: self.cpitch.unwrap_or(d.cpitch),
            chalf: self.chalf.unwrap_or(d.chalf),
            fec,
            border: self.border.unwrap_or(d.border),
            text_height: self.text_height.unwrap_or(d.text_height),
        };
        format.validate()?;
        Ok(format)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Encode {
            input,
            output,
            label,
            png,
            format,
        } => encode_cmd(input, output, label, png, &format),
        Command::Decode {
            format,
            base,
            output,
            no_debug,
        } => decode_cmd(&format, base, output, !no_debug),
        Command::Info { format } => info_cmd(&format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("optar: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn encode_cmd(
    input: PathBuf,
    output: Option<PathBuf>,
    label: Option<String>,
    png: bool,
    format: &FormatArgs,
) -> Result<()> {
    let format = format.resolve()?;
    let from_stdin = input.as_os_str() == "-";
    let payload = if from_stdin {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(&input)?
    };

    let label = label.unwrap_or_else(|| {
        if from_stdin {
            String::new()
        } else {
            input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    });
    let base = output.unwrap_or_else(|| PathBuf::from("optar_out"));
    let kind = if png {
        PageImageFormat::Png
    } else {
        PageImageFormat::Pgm
    };

    let pages = encode_file(&payload, &format, &label, &base, kind)?;
    eprintln!("{} bytes on {} page(s), format {}", payload.len(), pages.len(), format);
    Ok(())
}

fn decode_cmd(
    format: &PageFormat,
    base: PathBuf,
    output: Option<PathBuf>,
    write_debug: bool,
) -> Result<()> {
    let config = CalibrationConfig::global();
    let run = decode_files(&base, format, config, write_debug)?;
    match output {
        Some(path) => fs::write(path, &run.payload)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&run.payload)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn info_cmd(format: &FormatArgs) -> Result<()> {
    let format = format.resolve()?;
    let constants = PageConstants::new(&format);
    println!("Format {}", format);
    println!("Page {}x{} pixels", constants.width, constants.height);
    println!("{}", constants.channel_info());
    Ok(())
}
