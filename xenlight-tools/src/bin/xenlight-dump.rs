use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde_json::json;
use xenlight::{
    libxl::{DynLibxl, LibraryPaths},
    prelude::*,
    Context, ContextConfig, DomId, SinkLevel,
};

/// Dump host, domain and cpupool information from libxl as JSON.
#[derive(Clone, Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Logging level
    #[arg(short, long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,

    /// Minimum level of libxl's own messages.
    #[arg(long, default_value_t = SinkLevel::Error)]
    sink_level: SinkLevel,

    /// Path or soname of libxenlight.
    #[arg(long)]
    xenlight: Option<PathBuf>,

    /// Path or soname of libxentoollog.
    #[arg(long)]
    toollog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Subcommand, Debug)]
enum Command {
    /// Physical host information.
    Physinfo,
    /// Hypervisor version.
    Version,
    /// Running domains.
    Domains,
    /// vCPUs of a domain.
    Vcpus { domid: u32 },
    /// Cpupools and free CPUs.
    Cpupools,
    /// Everything above, except vCPUs.
    All,
}

fn open(args: &Args) -> anyhow::Result<Context<DynLibxl>> {
    let mut paths = LibraryPaths::default();

    if let Some(xenlight) = &args.xenlight {
        paths.xenlight = xenlight.clone();
    }

    if let Some(toollog) = &args.toollog {
        paths.toollog = toollog.clone();
    }

    let lib = DynLibxl::open(&paths).context("Unable to load libxl")?;
    let config = ContextConfig {
        sink_level: args.sink_level,
        ..Default::default()
    };

    let mut ctx = Context::with_config(lib, config);
    ctx.open().context("Unable to open libxl context")?;

    Ok(ctx)
}

fn dump(ctx: &Context<DynLibxl>, command: &Command) -> anyhow::Result<serde_json::Value> {
    Ok(match command {
        Command::Physinfo => json!({
            "physinfo": ctx.physinfo()?,
            "online_cpus": ctx.online_cpus()?,
            "free_memory": ctx.free_memory()?,
        }),
        Command::Version => {
            let info = ctx.version_info()?;
            json!({ "version": info.version(), "info": info })
        }
        Command::Domains => serde_json::to_value(ctx.list_domains()?)?,
        Command::Vcpus { domid } => serde_json::to_value(ctx.list_vcpus(DomId(*domid))?)?,
        Command::Cpupools => json!({
            "cpupools": ctx.list_cpupools()?,
            "free_cpus": ctx.free_cpus()?,
        }),
        Command::All => json!({
            "host": dump(ctx, &Command::Physinfo)?,
            "version": dump(ctx, &Command::Version)?,
            "domains": dump(ctx, &Command::Domains)?,
            "cpupools": dump(ctx, &Command::Cpupools)?,
        }),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let text_subscriber = tracing_subscriber::fmt()
        .with_ansi(true)
        .with_max_level(args.log_level)
        .compact()
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(text_subscriber)?;

    let ctx = open(&args)?;
    let value = dump(&ctx, &args.command)?;

    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
