//! Summary of a DXF file, optionally converted to another version.
//!
//! ```text
//! dxfinfo <input.dxf> [--strict] [--out <output.dxf>] [--version AC1015] [--binary]
//! ```
//!
//! Set `RUST_LOG=dxfcodec=debug` for reader and writer traces.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use dxfcodec::io::dxf::{DxfReader, DxfReaderConfiguration, DxfWriter, DxfWriterConfiguration};
use dxfcodec::{DxfVersion, NotificationType, ParseMode};

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    version: Option<DxfVersion>,
    binary: bool,
    strict: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut input = None;
    let mut output = None;
    let mut version = None;
    let mut binary = false;
    let mut strict = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--strict" => strict = true,
            "--binary" => binary = true,
            "--out" => output = Some(PathBuf::from(args.next().context("--out needs a path")?)),
            "--version" => {
                let tag = args.next().context("--version needs a tag such as AC1015")?;
                let parsed = DxfVersion::from_version_string(&tag);
                if parsed == DxfVersion::Unknown {
                    bail!("unsupported version {}", tag);
                }
                version = Some(parsed);
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            other => bail!("unexpected argument {}", other),
        }
    }

    Ok(Args {
        input: input.context("usage: dxfinfo <input.dxf> [--strict] [--out <file>] [--version <tag>] [--binary]")?,
        output,
        version,
        binary,
        strict,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = DxfReaderConfiguration {
        mode: if args.strict { ParseMode::Strict } else { ParseMode::Lenient },
        ..DxfReaderConfiguration::default()
    };
    let mut doc = DxfReader::from_file(&args.input)
        .and_then(|r| r.with_configuration(config).read())
        .with_context(|| format!("reading {}", args.input.display()))?;

    println!("{}", args.input.display());
    println!("  version     {} ({})", doc.version().as_str(), doc.version().release_name());
    println!("  layers      {}", doc.layers.len());
    println!("  linetypes   {}", doc.line_types.len());
    println!("  styles      {}", doc.text_styles.len());
    println!("  blocks      {}", doc.block_records.len());
    println!("  objects     {}", doc.object_count());

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for entity in doc.entities() {
        *by_type.entry(entity.dxf_name().to_string()).or_default() += 1;
    }
    println!("  entities    {}", doc.entity_count());
    for (name, count) in &by_type {
        println!("    {:<12}{}", name, count);
    }

    let errors = doc.notifications.of_type(NotificationType::Error).len();
    let warnings = doc.notifications.of_type(NotificationType::Warning).len();
    println!("  diagnostics {} errors, {} warnings", errors, warnings);
    for notification in doc.notifications.iter() {
        tracing::info!("{}", notification);
    }

    if let Some(output) = args.output {
        let version = args.version.unwrap_or_else(|| doc.version());
        let config = DxfWriterConfiguration {
            binary: args.binary,
            ..DxfWriterConfiguration::for_version(version)
        };
        DxfWriter::new(&mut doc)
            .with_configuration(config)
            .write_to_file(&output)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("wrote {} as {}", output.display(), version.as_str());
    }
    Ok(())
}
