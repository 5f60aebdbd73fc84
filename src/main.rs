use graceful::{DrainCoordinator, Drained, HttpServer, Signals};
use std::net;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod configuration;
mod web;

struct App {
    listen_addr: net::SocketAddr,
    max_uptime: Option<time::Duration>,
}

impl App {
    fn build(config: configuration::Config) -> anyhow::Result<Self> {
        let listen_addr = net::SocketAddr::from_str(&config.application.listen_addr)?;
        info!(listen_addr = listen_addr.to_string(), "got listen addr");

        Ok(Self {
            listen_addr,
            max_uptime: config.application.max_uptime(),
        })
    }

    async fn run(self) -> anyhow::Result<()> {
        // Subscribe first so a signal sent while binding still drains.
        let signals = Signals::os()?;

        let drained = self.start(signals)?;

        let trigger = drained.wait().await?;
        info!(%trigger, "drained, exiting");

        Ok(())
    }

    fn start(&self, signals: Signals) -> anyhow::Result<Drained> {
        let server = Arc::new(HttpServer::bind(&self.listen_addr, web::router())?);
        let coordinator = DrainCoordinator::with_signals(server, signals);

        let drained = match self.max_uptime {
            Some(max_uptime) => {
                info!(
                    max_uptime_secs = max_uptime.as_secs(),
                    "will drain after max uptime"
                );
                coordinator.start_cancelable(tokio::time::sleep(max_uptime))
            }
            None => coordinator.start(),
        };

        Ok(drained)
    }
}

fn serve(config: configuration::Config) -> anyhow::Result<()> {
    // Build the Tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("graceful")
        .thread_stack_size(3 * 1024 * 1024)
        .enable_all()
        .build()?;

    let app = App::build(config)?;

    runtime.block_on(app.run())
}

fn main() {
    let matches = clap::Command::new("graceful")
        .version(clap::crate_version!())
        .about("Serves HTTP and drains gracefully on SIGINT or SIGTERM")
        .arg(
            clap::Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Additional configuration file")
                .takes_value(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    // Initialize logger
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,graceful=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = matches.get_one::<PathBuf>("config");
    let config = match configuration::get_configuration(config_path.map(PathBuf::as_path)) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "unable to read configuration");
            std::process::exit(1);
        }
    };

    match serve(config) {
        Ok(()) => {}
        Err(err) => {
            error!(%err, "unable to serve, got err");
            std::process::exit(1);
        }
    }
}
