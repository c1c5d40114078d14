use clap::Parser;
use tradedesk_server::commandline::Commandline;
use tradedesk_server::error::TradedeskError;

#[tokio::main]
async fn main() -> Result<(), TradedeskError> {
	let commandline = Commandline::parse();
	commandline.run().await
}
