use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "HTTP gateway for the ns storage engine", long_about = None)]
pub struct Args {
    /// Address of the storage engine, `http://` is assumed when no scheme is given
    #[arg(long, env = "NS_HTTPADAPTER_STORAGE_ADDR", default_value = "storage:5200")]
    pub storage_addr: String,

    /// HTTP listening address
    #[arg(short, long, env = "NS_HTTPADAPTER_LISTEN", default_value = "0.0.0.0:5300")]
    pub listen: String,
}
