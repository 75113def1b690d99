use android_partitions::{Dump, Fstab, FstabFormat, FSTAB_HEADER};
use anyhow::{anyhow, Context};
use bpaf::Bpaf;
use camino::Utf8PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options)]
struct Options {
    #[bpaf(short, long)]
    /// Verbose output
    verbose: bool,

    #[bpaf(short, long, argument("FSTAB"))]
    /// Use this fstab instead of the one found in the dump
    fstab: Option<Utf8PathBuf>,

    #[bpaf(short, long)]
    /// Print the fstab in recovery format
    recovery: bool,

    #[bpaf(long)]
    /// List A/B partitions according to the fstab
    ab: bool,

    #[bpaf(short, long, argument("PARTITION"))]
    /// Print the build props of a partition
    props: Option<String>,

    #[bpaf(short, long("list-files"), argument("PARTITION"))]
    /// Print the proprietary-files list of a partition
    list_files: Option<String>,

    #[bpaf(positional("DUMP"))]
    /// Extracted dump directory
    dump: Utf8PathBuf,
}

/// Send diagnostics to stderr so the listings on stdout stay usable as
/// proprietary-files or prop input.
///
/// `--verbose` turns on debug output with level, target and line; `RUST_LOG`
/// takes precedence when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(verbose)
        .with_target(verbose)
        .with_line_number(verbose)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();

    debug!("Verbose logging enabled (default level {})", default_level);
}

fn main() -> anyhow::Result<()> {
    let options = options().run();

    init_logging(options.verbose);

    let mut dump = match &options.fstab {
        Some(fstab_path) => {
            info!("Using fstab {}", fstab_path);
            let fstab = Fstab::from_file(fstab_path)
                .with_context(|| format!("Failed to read {fstab_path}"))?;
            Dump::with_fstab(&options.dump, Some(fstab))?
        }
        None => Dump::open(&options.dump)?,
    };

    if let Some(name) = &options.props {
        let partition = dump
            .partition(name)
            .ok_or_else(|| anyhow!("Partition {name} not found in {}", options.dump))?;
        print!("{}", partition.build_prop);
        return Ok(());
    }

    if let Some(name) = &options.list_files {
        let partition = dump
            .partition_mut(name)
            .ok_or_else(|| anyhow!("Partition {name} not found in {}", options.dump))?;
        for file in partition.formatted_files() {
            println!("{file}");
        }
        return Ok(());
    }

    if options.recovery || options.ab {
        let fstab = dump
            .fstab()
            .ok_or_else(|| anyhow!("No fstab available for {}", options.dump))?;

        if options.ab {
            for model in fstab.ab_partition_models() {
                println!("{model}");
            }
        } else {
            print!("{}", fstab.format(FstabFormat::Recovery));
        }
        return Ok(());
    }

    print_summary(&dump);

    if let Some(fstab) = dump.fstab() {
        println!();
        print!("{FSTAB_HEADER}{fstab}");
    }

    Ok(())
}

fn print_summary(dump: &Dump) {
    for partition in dump.partitions() {
        let mount_point = partition
            .fstab_entry
            .as_ref()
            .map_or("-", |entry| entry.mount_point.as_str());

        println!(
            "{:<12} {:<8} {:>6} files  {}",
            partition.model.name,
            format!("{:?}", partition.model.group),
            partition.unsorted_files().len(),
            mount_point,
        );
    }

    match dump.device_info() {
        Ok(info) => println!("\nDevice: {} ({}), arch {}", info.codename, info.manufacturer, info.arch),
        Err(e) => debug!("Could not read device info: {}", e),
    }
}
