use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use exif_redate::config::{self, RunConfig};
use exif_redate::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "exif-redate",
    version,
    about = "Set the EXIF timestamp of every JPEG under a directory from its YYYY-MM-DD parent folder"
)]
struct Cli {
    /// Directory to search for .jpg/.jpeg files to update timestamp
    #[arg(short, long, value_name = "DIR", default_value = config::DEFAULT_IMAGE_DIR)]
    directory: PathBuf,

    /// Timezone in hours from UTC (+8 = Singapore, +9 = Japan, -5 = New York, etc)
    #[arg(
        short,
        long,
        value_name = "HOURS",
        default_value_t = config::DEFAULT_UTC_OFFSET_HOURS,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32)
            .range(config::MIN_UTC_OFFSET_HOURS as i64..=config::MAX_UTC_OFFSET_HOURS as i64)
    )]
    offset: i32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = RunConfig {
        root_dir: cli.directory,
        utc_offset_hours: cli.offset,
    };

    log::info!(
        "Searching {} (UTC offset {:+})",
        config.root_dir.display(),
        config.utc_offset_hours
    );

    pipeline::run(&config)
}
