use clap::Parser;
use colored::Color;
use common::logger::Logger;
use common::network::HttpGateway;
use common::session::SessionStore;
use common::storage::JsonFileStore;
use rider::auth::AuthFlow;
use rider::config::Args;
use rider::ui_handler::UIHandler;
use std::sync::Arc;
use tokio::signal::ctrl_c;

#[actix::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let logger = Logger::new("Rider", Color::Green).verbose(args.verbose);

    let store = match JsonFileStore::open(args.store_path.clone()) {
        Ok(store) => store,
        Err(e) => {
            logger.error(format!(
                "Cannot open session store {}: {}",
                args.store_path.display(),
                e
            ));
            std::process::exit(1);
        }
    };
    let gateway = match HttpGateway::new(args.gateway_config(), logger.scoped("gateway")) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            logger.error(format!("Invalid API configuration: {}", e));
            std::process::exit(1);
        }
    };
    logger.debug(format!("Using API at {}", args.api_url));

    let sessions = SessionStore::new(Arc::new(store));
    let auth = AuthFlow::new(gateway.clone(), sessions).with_logger(logger.scoped("session"));
    let ui = UIHandler::new(auth, gateway, logger.clone());

    tokio::select! {
        result = ui.run() => {
            if let Err(e) = &result {
                logger.error(format!("Input closed unexpectedly: {}", e));
            }
            println!("Bye!");
            result
        }
        _ = ctrl_c() => {
            println!("Ctrl-C received, shutting down...");
            actix::System::current().stop();
            // a prompt may still be blocked on stdin
            std::process::exit(0);
        }
    }
}
