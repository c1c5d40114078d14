use crate::backend::BackendClient;
use crate::backend::auth::LoginRequest;
use crate::configuration::Configuration;
use crate::context::ApplicationContext;
use crate::database::Database;
use crate::database::sqlite::SqliteDatabase;
use crate::error::TradedeskError;
use crate::server::run_server;
use crate::session::SessionStore;
use crate::utils::time_source::TimeSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
pub struct Commandline {
	#[clap(short = 'c', long = "config-file", default_value = "configuration.toml")]
	pub configuration_file_path: String,
	#[clap(subcommand)]
	pub command: Option<BaseCommand>,
}

#[derive(clap::Subcommand, Default)]
pub enum BaseCommand {
	/// Run the support chat server
	#[default]
	Run,
	/// Print the configuration
	Configuration,
	/// Apply pending database migrations
	Migrate,
	/// Sign in to the trading backend and store the session
	Login {
		email: String,
		password: String,
		/// Sign in to the admin console
		#[clap(long)]
		admin: bool,
	},
	/// Forget the stored session
	Logout,
}

impl Commandline {
	pub async fn run(self) -> Result<(), TradedeskError> {
		let configuration = Configuration::from_file(&self.configuration_file_path)?;

		tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::try_new(&configuration.log_filters)?)
			.init();

		let base_command = self.command.unwrap_or_default();
		match base_command {
			BaseCommand::Run => {
				let application_context = ApplicationContext::new(configuration, TimeSource::default()).await?;
				info!(
					"Starting server. Support API at 'http://{address}/api', realtime changes at 'ws://{address}/api/realtime'.",
					address = application_context.configuration.address
				);
				run_server(application_context).await?;
			}
			BaseCommand::Configuration => println!("{configuration:#?}"),
			BaseCommand::Migrate => {
				SqliteDatabase::connect(&configuration.database_url)
					.await?
					.migrate()
					.await?;
				info!(database_url = %configuration.database_url, "Database is up to date");
			}
			BaseCommand::Login { email, password, admin } => {
				let client = backend_client(&configuration)?;
				let request = LoginRequest { email, password };
				let user = if admin {
					client.admin_login(&request).await?
				} else {
					client.login(&request).await?
				};
				println!("Signed in as {}", user.email);
			}
			BaseCommand::Logout => backend_client(&configuration)?.logout()?,
		}
		Ok(())
	}
}

fn backend_client(configuration: &Configuration) -> Result<BackendClient, TradedeskError> {
	let session = SessionStore::load(&configuration.session_file)?;
	Ok(BackendClient::new(configuration.backend_url.clone(), session)?)
}
