mod common;
mod config;
mod error;
mod hwaddr;
mod iface;
mod layer4;
mod packet;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::WolError;
use crate::hwaddr::HardwareAddress;
use crate::layer4::BroadcastTarget;
use crate::packet::MagicPacket;

#[derive(Parser)]
#[command(about = "Send a Wake-on-LAN magic packet as a UDP broadcast")]
struct Cli {
    /// MAC address (e.g. AA-BB-CC-DD-EE-FF) or a host name from the config file
    target: Option<String>,

    /// IPv4 broadcast address (e.g. 192.168.1.255)
    #[arg(short, long)]
    broadcast: Option<String>,

    /// Use the broadcast address of this network interface
    #[arg(short, long, conflicts_with = "broadcast")]
    interface: Option<String>,

    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Send timeout in milliseconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print the packet instead of sending it
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(anyhow!("no input"));
    }
    Ok(line.trim().to_string())
}

#[derive(Debug)]
struct Request {
    mac: HardwareAddress,
    broadcast: BroadcastTarget,
}

fn resolve(opts: &Cli, cfg: &Config) -> Result<Request> {
    let target = match &opts.target {
        Some(t) => t.clone(),
        None => prompt("Enter target PC's MAC address (e.g., AA-BB-CC-DD-EE-FF): ")?,
    };

    let host = cfg.host(&target);
    let mac: HardwareAddress = match host {
        Some(h) => {
            log::info!("using host '{}' ({}) from config", target, h.mac);
            h.mac
        },
        None => target.parse()?,
    };

    let broadcast: BroadcastTarget = if let Some(b) = &opts.broadcast {
        b.parse()?
    } else if let Some(name) = &opts.interface {
        BroadcastTarget::from(iface::interface_broadcast(name)?)
    } else if let Some(b) = host.and_then(|h| h.broadcast).or(cfg.send_config().broadcast) {
        b
    } else {
        prompt("Enter network broadcast address (e.g., 192.168.1.255): ")?.parse()?
    };

    Ok(Request { mac, broadcast })
}

async fn run(opts: Cli) -> Result<()> {
    let cfg = Config::load(&opts.config)?;
    let req = resolve(&opts, &cfg)?;

    let packet = MagicPacket::new(&req.mac);
    log::info!("waking {} via broadcast address {}", req.mac, req.broadcast.addr());
    if opts.dry_run {
        println!("magic packet for {} to {}:\n{}", packet.target(), req.broadcast, packet.to_hex());
        return Ok(());
    }

    let mut send_opts = cfg.send_config().options();
    if let Some(ms) = opts.timeout {
        send_opts.timeout = Duration::from_millis(ms);
    }

    let cancel_token: CancellationToken = CancellationToken::new();
    let sigint_token = cancel_token.clone();
    ctrlc::set_handler(move || {
        log::warn!("Received SIGINT");
        sigint_token.cancel();
    }).context("Failed to install SIGINT handler")?;

    let sent = tokio::select! {
        res = layer4::send_magic_packet(&req.broadcast, &packet, &send_opts) => res?,
        _ = cancel_token.cancelled() => return Err(anyhow!("cancelled")),
    };

    println!("Magic packet sent successfully! {} bytes sent.", sent);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opts = Cli::parse();

    let level = match opts.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("unable to initialize logger: {}", e);
    }

    if let Err(e) = run(opts).await {
        log::debug!("{:?}", e);
        eprintln!("Error: {:#}", e);
        if let Some(code) = e.downcast_ref::<WolError>().and_then(WolError::os_error) {
            eprintln!("OS error code: {}", code);
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("wol-sender").chain(args.iter().copied()))
    }

    const CFG: &str = r#"
send:
  broadcast: 192.168.1.255
hosts:
  nas:
    mac: "AA-BB-CC-DD-EE-FF"
    broadcast: 10.0.0.255
"#;

    #[test]
    fn explicit_args() {
        let cfg = Config::default();
        let req = resolve(&cli(&["01:02:03:04:05:06", "-b", "172.16.0.255"]), &cfg).unwrap();
        assert_eq!(req.mac.as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(req.broadcast.to_string(), "172.16.0.255:9");
    }

    #[test]
    fn host_alias_and_its_broadcast() {
        let cfg = Config::parse(CFG).unwrap();
        let req = resolve(&cli(&["nas"]), &cfg).unwrap();
        assert_eq!(req.mac.to_string(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(req.broadcast.to_string(), "10.0.0.255:9");
    }

    #[test]
    fn cli_broadcast_overrides_config() {
        let cfg = Config::parse(CFG).unwrap();
        let req = resolve(&cli(&["nas", "-b", "192.168.7.255"]), &cfg).unwrap();
        assert_eq!(req.broadcast.to_string(), "192.168.7.255:9");
    }

    #[test]
    fn falls_back_to_config_default_broadcast() {
        let cfg = Config::parse(CFG).unwrap();
        let req = resolve(&cli(&["aa-bb-cc-dd-ee-01"]), &cfg).unwrap();
        assert_eq!(req.broadcast.to_string(), "192.168.1.255:9");
    }

    #[test]
    fn invalid_inputs_are_reported() {
        let cfg = Config::default();
        let err = resolve(&cli(&["AA-BB-CC-DD-EE", "-b", "192.168.1.255"]), &cfg).unwrap_err();
        assert!(matches!(err.downcast_ref::<error::WolError>(), Some(error::WolError::InvalidAddressFormat(_))));

        let err = resolve(&cli(&["AA-BB-CC-DD-EE-FF", "-b", "not.an.ip"]), &cfg).unwrap_err();
        assert!(matches!(err.downcast_ref::<error::WolError>(), Some(error::WolError::InvalidBroadcastAddress(_))));
    }

    #[test]
    fn interface_conflicts_with_broadcast() {
        let res = Cli::try_parse_from(["wol-sender", "nas", "-b", "10.0.0.255", "-i", "eth0"]);
        assert!(res.is_err());
    }
}
