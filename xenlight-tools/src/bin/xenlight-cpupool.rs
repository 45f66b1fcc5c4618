use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use xenlight::{
    cpupool::{CpupoolInfo, Scheduler},
    libxl::{DynLibxl, LibraryPaths},
    prelude::*,
    Bitmap, Context, ContextConfig, DomId, SinkLevel,
};

/// Manage Xen cpupools through libxl.
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
    /// List cpupools.
    List,
    /// CPUs not assigned to any pool.
    FreeCpus,
    /// Create a pool over the given CPUs (e.g. "4-7,10").
    Create {
        name: String,
        #[arg(short, long, default_value_t = Scheduler::Credit)]
        scheduler: Scheduler,
        #[arg(short, long, default_value_t = Bitmap::new())]
        cpus: Bitmap,
        /// Take the CPUs away from the pools holding them first.
        #[arg(long)]
        force: bool,
    },
    /// Destroy an empty pool.
    Destroy { name: String },
    Rename { name: String, new_name: String },
    /// Add CPUs to a pool.
    CpuAdd {
        name: String,
        #[arg(short, long, conflicts_with = "node", required_unless_present = "node")]
        cpus: Option<Bitmap>,
        /// Add every free CPU of a NUMA node.
        #[arg(short, long)]
        node: Option<u32>,
    },
    /// Remove CPUs from a pool.
    CpuRemove {
        name: String,
        #[arg(short, long, conflicts_with = "node", required_unless_present = "node")]
        cpus: Option<Bitmap>,
        /// Remove every CPU of a NUMA node.
        #[arg(short, long)]
        node: Option<u32>,
    },
    /// Move a domain to a pool.
    Migrate { domid: u32, name: String },
    /// Take CPUs away from whatever pool holds them.
    MakeFree { cpus: Bitmap },
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

fn find(ctx: &Context<DynLibxl>, name: &str) -> anyhow::Result<CpupoolInfo> {
    match ctx.cpupool_find_by_name(name)? {
        Some(pool) => Ok(pool),
        None => bail!("No cpupool named {name:?}"),
    }
}

fn run(ctx: &Context<DynLibxl>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            for pool in ctx.list_cpupools()? {
                println!(
                    "{:<16} {:>4} {:<10} {:>5}  {}",
                    pool.pool_name, pool.poolid, pool.scheduler, pool.n_dom, pool.cpumap
                );
            }
        }
        Command::FreeCpus => println!("{}", ctx.free_cpus()?),
        Command::Create {
            name,
            scheduler,
            cpus,
            force,
        } => {
            if force {
                ctx.cpupool_make_free(&cpus)?;
            }

            let poolid = ctx.cpupool_create(&name, scheduler, &cpus)?;
            tracing::info!("Created cpupool {name} ({poolid})");
        }
        Command::Destroy { name } => {
            let pool = find(ctx, &name)?;
            ctx.cpupool_destroy(pool.poolid)?;
        }
        Command::Rename { name, new_name } => {
            let pool = find(ctx, &name)?;
            ctx.cpupool_rename(pool.poolid, &new_name)?;
        }
        Command::CpuAdd { name, cpus, node } => {
            let pool = find(ctx, &name)?;

            match (cpus, node) {
                (Some(cpus), _) => ctx.cpupool_cpuadd_cpumap(pool.poolid, &cpus)?,
                (None, Some(node)) => {
                    let added = ctx.cpupool_cpuadd_node(pool.poolid, node)?;
                    tracing::info!("Added {added} cpus of node {node} to {name}");
                }
                (None, None) => bail!("Either --cpus or --node is required"),
            }
        }
        Command::CpuRemove { name, cpus, node } => {
            let pool = find(ctx, &name)?;

            match (cpus, node) {
                (Some(cpus), _) => ctx.cpupool_cpuremove_cpumap(pool.poolid, &cpus)?,
                (None, Some(node)) => {
                    let removed = ctx.cpupool_cpuremove_node(pool.poolid, node)?;
                    tracing::info!("Removed {removed} cpus of node {node} from {name}");
                }
                (None, None) => bail!("Either --cpus or --node is required"),
            }
        }
        Command::Migrate { domid, name } => {
            let pool = find(ctx, &name)?;
            ctx.cpupool_movedomain(pool.poolid, DomId(domid))?;
        }
        Command::MakeFree { cpus } => ctx.cpupool_make_free(&cpus)?,
    }

    Ok(())
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
    run(&ctx, args.command)
}
