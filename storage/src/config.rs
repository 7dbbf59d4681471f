use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::bail;

use crate::cli::Args;

#[derive(Clone, Debug)]
pub struct Config {
    pub root: PathBuf,
    pub listen: SocketAddr,
    pub chunk_size: usize,
}

impl Config {
    /// Checks the arguments and canonicalizes the root. All problems are
    /// reported together.
    pub async fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut validation_errors = Vec::new();

        let root = match tokio::fs::canonicalize(&args.root).await {
            Ok(root) => {
                match tokio::fs::metadata(&root).await {
                    Ok(meta) if meta.is_dir() => {}
                    _ => validation_errors.push(format!(
                        "NS_STORAGE_FM_ROOT `{}` exists but is not a directory",
                        args.root
                    )),
                }
                root
            }
            Err(e) => {
                validation_errors.push(format!(
                    "NS_STORAGE_FM_ROOT `{}` is not accessible: {e}",
                    args.root
                ));
                PathBuf::from(&args.root)
            }
        };

        let listen = args
            .listen
            .parse::<SocketAddr>()
            .map_err(|e| {
                validation_errors.push(format!(
                    "NS_STORAGE_LISTEN `{}` is not a socket address: {e}",
                    args.listen
                ))
            })
            .ok();

        match listen {
            Some(listen) if validation_errors.is_empty() => Ok(Config {
                root,
                listen,
                chunk_size: args.chunk_size as usize,
            }),
            _ => bail!(validation_errors.join("\n")),
        }
    }
}
