use clap::{Parser, Subcommand};
use compressed_transport::descriptor::FormatDescriptor;
use compressed_transport::{Publisher, Subscriber, batch, config, descriptor, frames, output};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compressed-transport")]
#[command(about = "Compress raw image frames for transport and restore them")]
#[command(long_about = "\
Compress raw image frames for transport and restore them

Every payload travels with a short text header describing how to undo the
compression:

  rgb8; jpeg compressed bgr8
  │     │                └── layout handed to the codec (color frames)
  │     └── codec: jpeg | png | qoi
  └── encoding of the original frame

Encode writes one payload per input plus a sibling .format file:

  out/
  ├── dawn.jpeg      # compressed bytes
  └── dawn.format    # header

Payloads without a header are decoded as legacy payloads.

Run 'compressed-transport gen-config' to generate a documented transport.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing transport.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress image files (or directories of them) into payloads
    Encode {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Encoding of the frames built from the inputs (mono8, rgb8, bgra16, ...)
        #[arg(long, default_value = "rgb8")]
        encoding: String,
        /// Where payloads and headers are written
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Restore a payload and save it as an image
    Decode {
        /// Payload file
        payload: PathBuf,
        /// Header text; defaults to the sibling .format file
        #[arg(long)]
        format: Option<String>,
        /// Image file to write (format follows the extension)
        #[arg(long, default_value = "decoded.png")]
        output: PathBuf,
    },
    /// Parse a header and describe it
    Inspect {
        header: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock transport.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("compressed_transport=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode {
            inputs,
            encoding,
            out_dir,
        } => {
            let transport = config::load_config(&cli.config)?;
            init_thread_pool(&transport.processing);
            let files = frames::collect_inputs(&inputs)?;
            let publisher = Publisher::new(transport);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_encode_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::encode_files(&files, &encoding, &out_dir, &publisher, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_batch_summary(&result?);
        }
        Command::Decode {
            payload,
            format,
            output: target,
        } => {
            let transport = config::load_config(&cli.config)?;
            let subscriber = Subscriber::new(transport);
            let frame = batch::decode_file(&payload, format.as_deref(), &target, &subscriber)?;
            output::print_decoded_frame(&frame, &target);
        }
        Command::Inspect { header, json } => {
            let parsed = descriptor::parse(&header)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&descriptor_json(&parsed))?);
            } else {
                output::print_descriptor(&parsed);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn descriptor_json(parsed: &FormatDescriptor) -> serde_json::Value {
    match parsed {
        FormatDescriptor::Tagged(d) => json!({
            "kind": "tagged",
            "original_encoding": d.original_encoding,
            "codec": d.codec.token(),
            "target_encoding": d.target_encoding,
        }),
        FormatDescriptor::Legacy { header } => json!({
            "kind": "legacy",
            "header": header,
        }),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can constrain
/// down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
