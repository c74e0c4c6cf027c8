use clap::Parser;
use nlq_gateway::config::{AppConfig, Args};
use nlq_gateway::server::init_logging;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let config = AppConfig::from_args(args)?;
    actix_web::rt::System::new().block_on(nlq_gateway::run(config))
}
