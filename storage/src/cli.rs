use clap::Parser;

/// Upper bound on a download chunk, well below the 4 MiB default gRPC
/// message limit.
pub const MAX_CHUNK_SIZE: u64 = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(version, about = "Storage engine for the ns file service", long_about = None)]
pub struct Args {
    /// Root directory every virtual path is resolved under
    #[arg(long, env = "NS_STORAGE_FM_ROOT", default_value = "/var/ns/default")]
    pub root: String,

    /// gRPC listening address
    #[arg(short, long, env = "NS_STORAGE_LISTEN", default_value = "0.0.0.0:5200")]
    pub listen: String,

    /// Size in bytes of the chunks a download is split into
    #[arg(
        long,
        env = "NS_STORAGE_CHUNK_SIZE",
        default_value_t = 64 * 1024,
        value_parser = clap::value_parser!(u64).range(1..=MAX_CHUNK_SIZE)
    )]
    pub chunk_size: u64,
}
