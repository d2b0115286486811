//! CLI for running pico-gs digital twin renders and diffing against
//! Verilator output.
//!
//! Takes a raw command-buffer file (the same byte stream a host driver
//! would DMA to `CMD_ADDR_64`/`CMD_WORDS`), runs it through the pipelined
//! twin, and either saves the resulting frame as a PNG or compares it
//! pixel-for-pixel against a reference frame captured from the gateware
//! simulation.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gs_twin::{RasterConfig, Twin};

#[derive(Parser)]
#[command(name = "gs-twin-cli")]
#[command(about = "Run pico-gs digital twin renders and diff them against Verilator output", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress output (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(clap::Args)]
struct FrameArgs {
    /// Path to the raw command-buffer byte stream to execute
    command_buffer: PathBuf,

    /// Frame buffer width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Frame buffer height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Frame buffer base address
    #[arg(long, default_value = "0")]
    fb_base: String,

    /// Depth buffer base address; defaults to immediately after the frame buffer
    #[arg(long)]
    z_base: Option<String>,

    /// Extra bytes of address space to reserve past the depth buffer, for
    /// command-buffer staging or texture loads embedded in the stream
    #[arg(long, default_value_t = 1 << 20)]
    extra_mem: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a command buffer and save the resulting frame as a PNG
    Render {
        #[command(flatten)]
        frame: FrameArgs,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Execute a command buffer and diff the resulting frame against a
    /// reference PNG (e.g. one captured from the Verilator gateware sim)
    Diff {
        #[command(flatten)]
        frame: FrameArgs,

        /// Reference PNG to compare against
        #[arg(long)]
        reference: PathBuf,
    },
}

fn parse_addr(s: &str) -> Result<u32> {
    let s = s.trim();
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    };
    value.with_context(|| format!("invalid address `{s}`"))
}

fn build_twin(frame: &FrameArgs) -> Result<(Twin, Vec<u8>)> {
    let fb_base = parse_addr(&frame.fb_base)?;
    let z_base = match &frame.z_base {
        Some(z) => parse_addr(z)?,
        None => fb_base + frame.width * frame.height * 3,
    };
    if z_base < fb_base + frame.width * frame.height * 3 {
        bail!("z_base {z_base:#x} overlaps the frame buffer ending at {:#x}", fb_base + frame.width * frame.height * 3);
    }

    let stream = fs::read(&frame.command_buffer)
        .with_context(|| format!("reading command buffer {}", frame.command_buffer.display()))?;

    let mem_size = (z_base as usize) + (frame.width * frame.height * 2) as usize + frame.extra_mem;
    let config = RasterConfig::new(frame.width, frame.height, fb_base, z_base);
    Ok((Twin::new(config, mem_size), stream))
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render { frame, output } => {
            let (mut twin, stream) = build_twin(&frame)?;
            twin.submit_command_buffer(&stream).with_context(|| "running command buffer")?;
            twin.scanout(&output).with_context(|| format!("writing {}", output.display()))?;
            if !cli.quiet {
                log::info!(
                    "rendered {}x{} frame from {} -> {} ({} pixels processed)",
                    frame.width,
                    frame.height,
                    frame.command_buffer.display(),
                    output.display(),
                    twin.perf().pixels_processed
                );
            }
        }
        Commands::Diff { frame, reference } => {
            let width = frame.width;
            let height = frame.height;
            let (mut twin, stream) = build_twin(&frame)?;
            twin.submit_command_buffer(&stream).with_context(|| "running command buffer")?;
            let actual = twin.capture();

            let reference_img = image::open(&reference)
                .with_context(|| format!("reading reference image {}", reference.display()))?
                .into_rgb8();
            if reference_img.width() != width || reference_img.height() != height {
                bail!(
                    "reference image is {}x{}, expected {}x{}",
                    reference_img.width(),
                    reference_img.height(),
                    width,
                    height
                );
            }

            let mut expected = vec![0u8; actual.len()];
            for (chunk_in, chunk_out) in reference_img.into_raw().chunks_exact(3).zip(expected.chunks_exact_mut(3)) {
                chunk_out[0] = chunk_in[2];
                chunk_out[1] = chunk_in[1];
                chunk_out[2] = chunk_in[0];
            }

            let mut mismatches = 0usize;
            for (i, (a, e)) in actual.chunks_exact(3).zip(expected.chunks_exact(3)).enumerate() {
                if a != e {
                    mismatches += 1;
                    if mismatches <= 10 {
                        let x = (i as u32) % width;
                        let y = (i as u32) / width;
                        eprintln!("pixel ({x},{y}): got bgr={a:?}, expected {e:?}");
                    }
                }
            }

            if mismatches > 0 {
                bail!("{mismatches} of {} pixels mismatched against {}", width * height, reference.display());
            }
            if !cli.quiet {
                log::info!("match: {} pixels identical to {}", width * height, reference.display());
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env().filter_level(log::LevelFilter::Info).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
