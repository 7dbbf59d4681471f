use std::net::SocketAddr;

use anyhow::bail;
use tonic::transport::Endpoint;

use crate::cli::Args;

#[derive(Clone, Debug)]
pub struct Config {
    pub storage: Endpoint,
    pub listen: SocketAddr,
}

fn with_scheme(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    }
}

impl Config {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut validation_errors = Vec::new();

        let storage = Endpoint::from_shared(with_scheme(&args.storage_addr))
            .map_err(|e| {
                validation_errors.push(format!(
                    "NS_HTTPADAPTER_STORAGE_ADDR `{}` is not a valid address: {e}",
                    args.storage_addr
                ))
            })
            .ok();

        let listen = args
            .listen
            .parse::<SocketAddr>()
            .map_err(|e| {
                validation_errors.push(format!(
                    "NS_HTTPADAPTER_LISTEN `{}` is not a socket address: {e}",
                    args.listen
                ))
            })
            .ok();

        match (storage, listen) {
            (Some(storage), Some(listen)) => Ok(Config { storage, listen }),
            _ => bail!(validation_errors.join("\n")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["httpadapter"]);
        let cfg = Config::from_args(&args).unwrap();
        let uri = cfg.storage.uri();
        assert_eq!(uri.scheme_str(), Some("http"));
        assert_eq!(uri.host(), Some("storage"));
        assert_eq!(uri.port_u16(), Some(5200));
        assert_eq!(cfg.listen.port(), 5300);
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        assert_eq!(with_scheme("https://10.0.0.1:5200"), "https://10.0.0.1:5200");
        assert_eq!(with_scheme("127.0.0.1:5200"), "http://127.0.0.1:5200");
    }

    #[test]
    fn test_invalid_values_are_all_reported() {
        let args = Args::parse_from([
            "httpadapter",
            "--storage-addr",
            "bad host:5200",
            "--listen",
            "nowhere",
        ]);
        let err = Config::from_args(&args).unwrap_err().to_string();
        assert!(err.contains("NS_HTTPADAPTER_STORAGE_ADDR"), "{err}");
        assert!(err.contains("NS_HTTPADAPTER_LISTEN"), "{err}");
    }
}
